//! Error types for text engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextError {
    #[error("Invalid glyph width table: {0}")]
    InvalidWidthTable(String),

    #[error("Malformed glyph width file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TextError>;
