//! Bitfield coder: a mask-selected subset of optional fields
//!
//! Each field owns one distinct power-of-two bit. Present fields are written
//! back to back in canonical (ascending bit) order; absent fields take no
//! space at all.
//!
//! The bare API (`encode_fields` / `decode_fields`) takes the presence mask
//! from the caller, as transaction headers carry it elsewhere. When a
//! bitfield is used through the generic [`Coder`](super::Coder) dispatch it
//! is self-describing: a mask word followed by the present fields.

use std::collections::HashSet;

use lib_types::WORD_SIZE;

use super::{read_word, CoderArena, CoderId, Encoded, HeapBudget};
use crate::errors::{AbiError, AbiResult};
use crate::value::AbiValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitfieldField {
    pub tag: String,
    pub bit: u32,
    pub coder: CoderId,
}

impl BitfieldField {
    pub fn new(tag: impl Into<String>, bit: u32, coder: CoderId) -> Self {
        Self {
            tag: tag.into(),
            bit,
            coder,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitfieldCoder {
    name: String,
    fields: Vec<BitfieldField>,
}

impl BitfieldCoder {
    pub fn new(name: impl Into<String>, mut fields: Vec<BitfieldField>) -> AbiResult<Self> {
        let name = name.into();
        let mut seen = HashSet::new();
        for field in &fields {
            if !field.bit.is_power_of_two() {
                return Err(AbiError::schema(format!(
                    "{name} field {} has bit {:#x}, which is not a power of two.",
                    field.tag, field.bit
                )));
            }
            if !seen.insert(field.bit) {
                return Err(AbiError::schema(format!(
                    "{name} field {} reuses bit {:#x}.",
                    field.tag, field.bit
                )));
            }
        }
        fields.sort_by_key(|f| f.bit);
        Ok(Self { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in canonical order
    pub fn fields(&self) -> &[BitfieldField] {
        &self.fields
    }

    pub fn field(&self, bit: u32) -> Option<&BitfieldField> {
        self.fields.iter().find(|f| f.bit == bit)
    }

    /// Mask naming every known field
    pub fn known_mask(&self) -> u32 {
        self.fields.iter().fold(0, |mask, f| mask | f.bit)
    }

    /// Presence mask for a set of entries
    pub fn mask_of(&self, entries: &[(u32, AbiValue)]) -> AbiResult<u32> {
        let mut mask = 0u32;
        for (bit, _) in entries {
            if self.field(*bit).is_none() {
                return Err(AbiError::encode(format!("Unknown {} field bit {bit:#x}.", self.name)));
            }
            if mask & bit != 0 {
                return Err(AbiError::encode(format!(
                    "Duplicate {} field bit {bit:#x}.",
                    self.name
                )));
            }
            mask |= bit;
        }
        Ok(mask)
    }

    /// Encode present fields in canonical order, whatever order they come in
    pub fn encode_fields(
        &self,
        arena: &CoderArena,
        entries: &[(u32, AbiValue)],
    ) -> AbiResult<Encoded> {
        let mask = self.mask_of(entries)?;
        let mut out = Encoded::new();
        for field in self.fields.iter().filter(|f| mask & f.bit != 0) {
            let (_, value) = entries
                .iter()
                .find(|(bit, _)| *bit == field.bit)
                .ok_or_else(|| AbiError::encode(format!("Missing {} field.", field.tag)))?;
            out.append(arena.encode_value(field.coder, value)?);
        }
        Ok(out)
    }

    /// Decode the fields selected by `mask`, starting at `offset`
    pub fn decode_fields(
        &self,
        arena: &CoderArena,
        bytes: &[u8],
        offset: usize,
        mask: u32,
    ) -> AbiResult<(Vec<(u32, AbiValue)>, usize)> {
        let budget = HeapBudget::new(arena.config().max_heap_length);
        self.decode_fields_within(arena, bytes, offset, mask, &budget)
    }

    fn decode_fields_within(
        &self,
        arena: &CoderArena,
        bytes: &[u8],
        offset: usize,
        mask: u32,
        budget: &HeapBudget,
    ) -> AbiResult<(Vec<(u32, AbiValue)>, usize)> {
        let unknown = mask & !self.known_mask();
        if unknown != 0 {
            tracing::warn!(
                "{}: ignoring unknown presence bits {:#x} in mask {:#x}",
                self.name,
                unknown,
                mask
            );
        }

        let mut entries = Vec::new();
        let mut cursor = offset;
        for field in self.fields.iter().filter(|f| mask & f.bit != 0) {
            let (value, next) = arena.decode_within(field.coder, bytes, cursor, budget)?;
            entries.push((field.bit, value));
            cursor = next;
        }
        Ok((entries, cursor))
    }

    pub fn encode(&self, arena: &CoderArena, value: &AbiValue) -> AbiResult<Encoded> {
        let AbiValue::Bitfield(entries) = value else {
            return Err(AbiError::encode(format!(
                "Invalid {}. Expected bitfield value, got {}.",
                self.name,
                value.kind()
            )));
        };
        let mask = self.mask_of(entries)?;
        let mut out = Encoded::word(u64::from(mask));
        out.append(self.encode_fields(arena, entries)?);
        Ok(out)
    }

    pub fn decode(
        &self,
        arena: &CoderArena,
        bytes: &[u8],
        offset: usize,
        budget: &HeapBudget,
    ) -> AbiResult<(AbiValue, usize)> {
        let word = read_word(bytes, offset)
            .ok_or_else(|| AbiError::decode(format!("Invalid {} data size.", self.name)))?;
        let mask = u32::try_from(word)
            .map_err(|_| AbiError::decode(format!("Invalid {} mask {word:#x}.", self.name)))?;
        let (entries, cursor) =
            self.decode_fields_within(arena, bytes, offset + WORD_SIZE, mask, budget)?;
        Ok((AbiValue::Bitfield(entries), cursor))
    }
}
