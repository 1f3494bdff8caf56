//! Fixed-length byte blocks: `[u8; N]`-style raw blocks and `str[N]` text
//!
//! The payload is right-padded with zeros to the next word boundary.

use lib_types::padded_len;

use crate::errors::{AbiError, AbiResult};
use crate::value::AbiValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteArrayCoder {
    length: usize,
    text: bool,
}

impl ByteArrayCoder {
    /// Raw block of `length` bytes
    ///
    /// No ABI type string maps to this; it is for coders built by hand, such
    /// as fixed-size fields in transaction layouts.
    pub const fn raw(length: usize) -> Self {
        Self { length, text: false }
    }

    /// Fixed UTF-8 string of `length` bytes (`str[N]`)
    pub const fn text(length: usize) -> Self {
        Self { length, text: true }
    }

    pub const fn length(&self) -> usize {
        self.length
    }

    pub const fn is_text(&self) -> bool {
        self.text
    }

    /// In-place width, word aligned
    pub const fn encoded_width(&self) -> usize {
        padded_len(self.length)
    }

    fn type_name(&self) -> String {
        if self.text {
            format!("str[{}]", self.length)
        } else {
            format!("byte[{}]", self.length)
        }
    }

    pub fn encode(&self, value: &AbiValue) -> AbiResult<Vec<u8>> {
        let raw: &[u8] = match (value, self.text) {
            (AbiValue::Str(s), true) => s.as_bytes(),
            (AbiValue::Bytes(b), false) => b,
            _ => {
                return Err(AbiError::encode(format!(
                    "Expected {} value, got {}.",
                    self.type_name(),
                    value.kind()
                )))
            }
        };
        if raw.len() != self.length {
            return Err(AbiError::encode(format!(
                "Value length mismatch during encode of {}: got {} bytes.",
                self.type_name(),
                raw.len()
            )));
        }
        let mut out = raw.to_vec();
        out.resize(self.encoded_width(), 0);
        Ok(out)
    }

    pub fn decode(&self, bytes: &[u8], offset: usize) -> AbiResult<(AbiValue, usize)> {
        let end = offset
            .checked_add(self.encoded_width())
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| AbiError::decode(format!("Invalid {} data size.", self.type_name())))?;
        let raw = bytes[offset..offset + self.length].to_vec();
        let value = if self.text {
            let s = String::from_utf8(raw)
                .map_err(|_| AbiError::decode(format!("Invalid UTF-8 in {}.", self.type_name())))?;
            AbiValue::Str(s)
        } else {
            AbiValue::Bytes(raw)
        };
        Ok((value, end))
    }
}
