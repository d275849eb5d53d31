//! Error types shared by the price service crates

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, PricesError>;

/// Errors raised by shared domain types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricesError {
    #[error("Unsupported archive type: {0}. Expected 'zip' or 'tar'")]
    UnsupportedArchive(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
