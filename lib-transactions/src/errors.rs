//! Transaction Errors

use lib_abi_coder::AbiError;
use thiserror::Error;

use crate::policy::PolicyType;

/// Error while encoding or decoding transaction policies
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Duplicate policy: {0:?}")]
    Duplicate(PolicyType),

    #[error("Value {value} out of range for policy {policy:?}")]
    OutOfRange { policy: PolicyType, value: u64 },

    #[error("Unexpected value for policy {0:?}")]
    UnexpectedValue(PolicyType),

    #[error(transparent)]
    Abi(#[from] AbiError),
}

/// Result type for policy operations
pub type PolicyResult<T> = Result<T, PolicyError>;
