//! Crate-wide error kinds (spec §7).

use thiserror::Error;

/// One of the five error kinds the core ever raises. Every fallible operation
/// returns `Result<_, Error>` — there is no sentinel or partial result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid input at byte {offset}: {message}")]
    InvalidInput { offset: usize, message: String },

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("codec error at byte offset {offset}: {message}")]
    Codec { offset: usize, message: String },

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_input(offset: usize, message: impl Into<String>) -> Self {
        Error::InvalidInput { offset, message: message.into() }
    }

    pub fn codec(offset: usize, message: impl Into<String>) -> Self {
        Error::Codec { offset, message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
