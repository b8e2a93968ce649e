//! Error types for the math crate

use thiserror::Error;

/// Errors that can occur in math operations
#[derive(Error, Debug)]
pub enum MathError {
    /// Markup could not be tokenized (imbalanced brackets, duplicate scripts)
    #[error("Tokenization error: {0}")]
    Tokenization(String),

    /// A function or script could not fetch the groups it needs
    #[error("Build error: {0}")]
    Build(String),

    /// Symbol tables or settings are malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Glyph metrics could not be constructed
    #[error("Metrics error: {0}")]
    Metrics(#[from] text_engine::TextError),

    /// JSON error from serde_json
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error while reading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MathError {
    /// Whether the error stems from the markup itself rather than configuration
    pub fn is_markup_error(&self) -> bool {
        matches!(self, MathError::Tokenization(_) | MathError::Build(_))
    }
}

/// Result type for math operations
pub type MathResult<T> = Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MathError::Tokenization("imbalanced brackets".to_string());
        assert_eq!(err.to_string(), "Tokenization error: imbalanced brackets");
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let math_err: MathError = json_err.into();
        assert!(matches!(math_err, MathError::Json(_)));
        assert!(!math_err.is_markup_error());
    }

    #[test]
    fn test_markup_errors() {
        assert!(MathError::Build("missing group".into()).is_markup_error());
        assert!(!MathError::Config("bad table".into()).is_markup_error());
    }
}
