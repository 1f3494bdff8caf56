//! Boolean coder: one word holding 0 or 1

use lib_types::{word_to_bytes, Word, WORD_SIZE};

use super::read_word;
use crate::errors::{AbiError, AbiResult};
use crate::value::AbiValue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BooleanCoder;

impl BooleanCoder {
    pub const fn new() -> Self {
        Self
    }

    pub fn encode(&self, value: &AbiValue) -> AbiResult<Vec<u8>> {
        match value {
            AbiValue::Bool(b) => Ok(word_to_bytes(Word::from(*b)).to_vec()),
            _ => Err(AbiError::encode("Invalid boolean value.")),
        }
    }

    pub fn decode(&self, bytes: &[u8], offset: usize) -> AbiResult<(AbiValue, usize)> {
        let word =
            read_word(bytes, offset).ok_or_else(|| AbiError::decode("Invalid boolean data size."))?;
        // Anything but 0/1 is corrupt data, never a truthy number
        let value = match word {
            0 => false,
            1 => true,
            _ => return Err(AbiError::decode("Invalid boolean value.")),
        };
        Ok((AbiValue::Bool(value), offset + WORD_SIZE))
    }
}
