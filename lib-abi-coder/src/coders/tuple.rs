//! Heterogeneous tuples, encoded positionally in declaration order

use super::{CoderArena, CoderId, Encoded, HeapBudget};
use crate::errors::{AbiError, AbiResult};
use crate::value::AbiValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleCoder {
    components: Vec<CoderId>,
}

impl TupleCoder {
    pub fn new(components: Vec<CoderId>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[CoderId] {
        &self.components
    }

    pub fn encode(&self, arena: &CoderArena, value: &AbiValue) -> AbiResult<Encoded> {
        // `()` is a zero-component tuple
        if self.components.is_empty() && *value == AbiValue::Unit {
            return Ok(Encoded::new());
        }
        let items = value
            .as_sequence()
            .ok_or_else(|| AbiError::encode("Expected tuple value."))?;
        if items.len() != self.components.len() {
            return Err(AbiError::encode("Types/values length mismatch."));
        }

        let mut out = Encoded::new();
        for (coder, item) in self.components.iter().zip(items) {
            out.append(arena.encode_value(*coder, item)?);
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
        if self.components.is_empty() {
            return Ok((AbiValue::Unit, offset));
        }

        let mut items = Vec::with_capacity(self.components.len());
        let mut cursor = offset;
        for coder in &self.components {
            let (item, next) = arena.decode_within(*coder, bytes, cursor, budget)?;
            items.push(item);
            cursor = next;
        }
        Ok((AbiValue::Tuple(items), cursor))
    }
}
