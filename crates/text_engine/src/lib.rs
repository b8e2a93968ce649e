//! Text Engine - Glyph width metrics
//!
//! This crate measures text for the plain-text math layout engine. It knows
//! nothing about markup; it only answers "how wide is this fragment".
//!
//! # Modules
//!
//! - `metrics`: the `FontMetrics` capability plus monospace and
//!   table-driven proportional providers
//! - `cache`: memoizing wrapper shared by reference across layout calls

mod cache;
mod error;
mod metrics;

pub use cache::*;
pub use error::*;
pub use metrics::*;
