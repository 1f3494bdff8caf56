//! 256-bit hash coder (four words)

use lib_types::{B256, B256_SIZE};

use crate::errors::{AbiError, AbiResult};
use crate::value::AbiValue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct B256Coder;

impl B256Coder {
    pub const fn new() -> Self {
        Self
    }

    pub fn encode(&self, value: &AbiValue) -> AbiResult<Vec<u8>> {
        let hash = match value {
            AbiValue::B256(hash) => *hash,
            AbiValue::Str(text) => {
                B256::from_hex(text).map_err(|e| AbiError::encode(format!("Invalid b256: {e}.")))?
            }
            AbiValue::Bytes(bytes) => B256::try_from(bytes.as_slice())
                .map_err(|e| AbiError::encode(format!("Invalid b256: {e}.")))?,
            _ => return Err(AbiError::encode("Invalid b256.")),
        };
        Ok(hash.0.to_vec())
    }

    pub fn decode(&self, bytes: &[u8], offset: usize) -> AbiResult<(AbiValue, usize)> {
        let end = offset
            .checked_add(B256_SIZE)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| AbiError::decode("Invalid b256 data size."))?;
        let hash = B256::try_from(&bytes[offset..end])
            .map_err(|e| AbiError::decode(format!("Invalid b256: {e}.")))?;
        Ok((AbiValue::B256(hash), end))
    }
}
