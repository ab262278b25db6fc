//! Error types for evex.

use thiserror::Error;

/// Result type for evex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for evex operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided (malformed example, bad span, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A persisted pattern store could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Pattern construction failed (no usable representation).
    #[error("Pattern construction failed: {0}")]
    Pattern(String),

    /// Document-level tagging failure.
    #[error("Tagging failed: {0}")]
    Tagging(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a pattern construction error.
    pub fn pattern(msg: impl Into<String>) -> Self {
        Error::Pattern(msg.into())
    }

    /// Create a tagging error.
    pub fn tagging(msg: impl Into<String>) -> Self {
        Error::Tagging(msg.into())
    }
}
