//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur while preparing regression fixtures
#[derive(Debug, Error)]
pub enum TestError {
    /// Requested glyph is not a decimal digit
    #[error("no glyph for digit {0}")]
    UnknownDigit(u8),

    /// Failed to build a fixture image
    #[error("failed to build fixture: {0}")]
    Fixture(#[from] digitcount_core::Error),

    /// Failed to encode a fixture image
    #[error("failed to encode fixture as {format}: {message}")]
    Encode { format: &'static str, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
