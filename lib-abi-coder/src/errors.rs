//! ABI Coder Errors

use thiserror::Error;

/// Error raised by coders, the resolver and the interface
///
/// Encode and decode failures are surfaced to the immediate caller and never
/// retried. No partial output is returned alongside an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Value does not fit the coder's shape or range
    #[error("Encode error: {0}")]
    Encode(String),

    /// Bytes do not hold a valid value for the coder
    #[error("Decode error: {0}")]
    Decode(String),

    /// Schema cannot be turned into a coder tree
    #[error("Invalid ABI schema: {0}")]
    Schema(String),
}

impl AbiError {
    pub(crate) fn encode(msg: impl Into<String>) -> Self {
        AbiError::Encode(msg.into())
    }

    pub(crate) fn decode(msg: impl Into<String>) -> Self {
        AbiError::Decode(msg.into())
    }

    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        AbiError::Schema(msg.into())
    }

    /// The human-readable message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            AbiError::Encode(msg) | AbiError::Decode(msg) | AbiError::Schema(msg) => msg,
        }
    }
}

/// Result type for ABI operations
pub type AbiResult<T> = Result<T, AbiError>;
