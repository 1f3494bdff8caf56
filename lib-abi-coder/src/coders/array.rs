//! Fixed-length homogeneous arrays

use super::{CoderArena, CoderId, Encoded, HeapBudget};
use crate::errors::{AbiError, AbiResult};
use crate::value::AbiValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayCoder {
    element: CoderId,
    length: usize,
}

impl ArrayCoder {
    pub const fn new(element: CoderId, length: usize) -> Self {
        Self { element, length }
    }

    pub const fn element(&self) -> CoderId {
        self.element
    }

    pub const fn length(&self) -> usize {
        self.length
    }

    pub fn encode(&self, arena: &CoderArena, value: &AbiValue) -> AbiResult<Encoded> {
        let items = value
            .as_sequence()
            .ok_or_else(|| AbiError::encode("Expected array value."))?;
        if items.len() != self.length {
            return Err(AbiError::encode("Types/values length mismatch."));
        }

        let mut out = Encoded::new();
        for item in items {
            out.append(arena.encode_value(self.element, item)?);
        }
        Ok(out)
    }

    pub fn decode(
        &self,
        arena: &CoderArena,
        bytes: &[u8],
        offset: usize,
        budget: &HeapBudget,
    ) -> AbiResult<(AbiValue, usize)> {
        let width = arena.width(self.element)?;
        let size = width
            .checked_mul(self.length)
            .ok_or_else(|| AbiError::decode("Invalid array data size."))?;
        if bytes.len().saturating_sub(offset) < size || offset > bytes.len() {
            return Err(AbiError::decode("Invalid array data size."));
        }

        let mut items = Vec::with_capacity(self.length);
        let mut cursor = offset;
        for _ in 0..self.length {
            let (item, next) = arena.decode_within(self.element, bytes, cursor, budget)?;
            items.push(item);
            cursor = next;
        }
        Ok((AbiValue::Array(items), cursor))
    }
}
