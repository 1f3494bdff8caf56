//! Unsigned integer coder (`u8`, `u16`, `u32`, `u64`)
//!
//! Every width occupies one big-endian word; the value sits in the low-order
//! bytes and the rest is zero.

use lib_types::{word_to_bytes, WORD_SIZE};

use super::read_word;
use crate::errors::{AbiError, AbiResult};
use crate::value::AbiValue;

/// Declared bit width of an unsigned integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberWidth {
    U8,
    U16,
    U32,
    U64,
}

impl NumberWidth {
    pub const fn bits(self) -> u32 {
        match self {
            NumberWidth::U8 => 8,
            NumberWidth::U16 => 16,
            NumberWidth::U32 => 32,
            NumberWidth::U64 => 64,
        }
    }

    /// Largest representable value
    pub const fn max(self) -> u64 {
        match self {
            NumberWidth::U8 => u8::MAX as u64,
            NumberWidth::U16 => u16::MAX as u64,
            NumberWidth::U32 => u32::MAX as u64,
            NumberWidth::U64 => u64::MAX,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            NumberWidth::U8 => "u8",
            NumberWidth::U16 => "u16",
            NumberWidth::U32 => "u32",
            NumberWidth::U64 => "u64",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "u8" => Some(NumberWidth::U8),
            "u16" => Some(NumberWidth::U16),
            "u32" => Some(NumberWidth::U32),
            "u64" => Some(NumberWidth::U64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberCoder {
    width: NumberWidth,
}

impl NumberCoder {
    pub const fn new(width: NumberWidth) -> Self {
        Self { width }
    }

    pub const fn width(&self) -> NumberWidth {
        self.width
    }

    pub fn encode(&self, value: &AbiValue) -> AbiResult<Vec<u8>> {
        let name = self.width.name();
        let n = value
            .as_number()
            .ok_or_else(|| AbiError::encode(format!("Invalid {name}.")))?;
        if n > self.width.max() {
            return Err(AbiError::encode(format!("Invalid {name}, too many bytes.")));
        }
        Ok(word_to_bytes(n).to_vec())
    }

    pub fn decode(&self, bytes: &[u8], offset: usize) -> AbiResult<(AbiValue, usize)> {
        let word = read_word(bytes, offset)
            .ok_or_else(|| AbiError::decode(format!("Invalid {} data size.", self.width.name())))?;
        Ok((AbiValue::Number(word & self.width.max()), offset + WORD_SIZE))
    }
}
