//! Heap-backed coders: `Vec<T>`, `Bytes` and `String`
//!
//! # Descriptor
//!
//! ```text
//! [ pointer ][ length ][ capacity ]     3 words, in place
//! ```
//!
//! The pointer is an absolute offset into the full buffer and always points
//! forward, past the descriptor itself. Capacity mirrors length on encode and
//! is ignored on decode. The in-place cursor advances by the descriptor only;
//! the segment is found through the pointer.

use std::cell::Cell;

use lib_types::WORD_SIZE;

use super::{read_word, CoderArena, CoderId, Encoded};
use crate::config::CoderConfig;
use crate::errors::{AbiError, AbiResult};
use crate::value::AbiValue;

/// In-place size of a heap descriptor
pub const DESCRIPTOR_SIZE: usize = 3 * WORD_SIZE;

/// Heap items one top-level decode may still produce
///
/// Charged with element counts for vectors and byte counts for `Bytes` and
/// `String`. Descriptors may alias one segment and zero-width elements need
/// no bytes at all, so the buffer size alone does not bound a decode.
#[derive(Debug)]
pub struct HeapBudget {
    limit: u64,
    remaining: Cell<u64>,
}

impl HeapBudget {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: Cell::new(limit),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining.get()
    }

    fn charge(&self, count: usize, what: &str) -> AbiResult<()> {
        let left = self.remaining.get();
        match u64::try_from(count).ok().filter(|count| *count <= left) {
            Some(count) => {
                self.remaining.set(left - count);
                Ok(())
            }
            None => Err(AbiError::decode(format!(
                "Invalid {what} length {count}: heap limit of {} exceeded.",
                self.limit
            ))),
        }
    }
}

/// `(pointer, length)` read from a descriptor, validated against the buffer
fn read_descriptor(
    config: &CoderConfig,
    bytes: &[u8],
    offset: usize,
    what: &str,
) -> AbiResult<(usize, usize)> {
    let (pointer, length) = match (
        read_word(bytes, offset),
        read_word(bytes, offset.saturating_add(WORD_SIZE)),
        read_word(bytes, offset.saturating_add(2 * WORD_SIZE)),
    ) {
        (Some(pointer), Some(length), Some(_capacity)) => (pointer, length),
        _ => return Err(AbiError::decode(format!("Invalid {what} data size."))),
    };

    // Limit checked before anything is allocated
    if length > config.max_heap_length {
        return Err(AbiError::decode(format!(
            "Invalid {what} length {length}: exceeds maximum {}.",
            config.max_heap_length
        )));
    }
    let pointer = usize::try_from(pointer)
        .map_err(|_| AbiError::decode(format!("Invalid {what} pointer.")))?;
    if pointer < offset + DESCRIPTOR_SIZE {
        return Err(AbiError::decode(format!("Invalid {what} pointer.")));
    }
    let length = usize::try_from(length)
        .map_err(|_| AbiError::decode(format!("Invalid {what} data size.")))?;
    Ok((pointer, length))
}

fn check_segment(bytes: &[u8], pointer: usize, size: Option<usize>, what: &str) -> AbiResult<()> {
    match size.and_then(|size| pointer.checked_add(size)) {
        Some(end) if end <= bytes.len() => Ok(()),
        _ => Err(AbiError::decode(format!("Invalid {what} data size."))),
    }
}

/// `Vec<T>`: elements encoded back to back in the heap segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VecCoder {
    element: CoderId,
}

impl VecCoder {
    pub const fn new(element: CoderId) -> Self {
        Self { element }
    }

    pub const fn element(&self) -> CoderId {
        self.element
    }

    pub fn encode(&self, arena: &CoderArena, value: &AbiValue) -> AbiResult<Encoded> {
        let items = value
            .as_sequence()
            .ok_or_else(|| AbiError::encode("Expected array value."))?;

        let mut segment = Encoded::new();
        for item in items {
            segment.append(arena.encode_value(self.element, item)?);
        }
        Ok(Encoded::descriptor(items.len() as u64, segment))
    }

    pub fn decode(
        &self,
        arena: &CoderArena,
        bytes: &[u8],
        offset: usize,
        budget: &HeapBudget,
    ) -> AbiResult<(AbiValue, usize)> {
        let (pointer, length) = read_descriptor(arena.config(), bytes, offset, "vec")?;
        let width = arena.width(self.element)?;
        check_segment(bytes, pointer, width.checked_mul(length), "vec")?;
        budget.charge(length, "vec")?;

        let mut items = Vec::with_capacity(length);
        let mut cursor = pointer;
        for _ in 0..length {
            let (item, next) = arena.decode_within(self.element, bytes, cursor, budget)?;
            items.push(item);
            cursor = next;
        }
        Ok((AbiValue::Array(items), offset + DESCRIPTOR_SIZE))
    }
}

/// Raw heap payload flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapKind {
    Bytes,
    /// UTF-8 validated on decode
    String,
}

impl HeapKind {
    fn name(self) -> &'static str {
        match self {
            HeapKind::Bytes => "bytes",
            HeapKind::String => "string",
        }
    }
}

/// `Bytes` / `String`: raw bytes in the heap, segment padded to a word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapBytesCoder {
    kind: HeapKind,
}

impl HeapBytesCoder {
    pub const fn new(kind: HeapKind) -> Self {
        Self { kind }
    }

    pub const fn kind(&self) -> HeapKind {
        self.kind
    }

    pub fn encode(&self, value: &AbiValue) -> AbiResult<Encoded> {
        let raw: &[u8] = match (value, self.kind) {
            (AbiValue::Bytes(b), HeapKind::Bytes) => b,
            (AbiValue::Str(s), HeapKind::String) => s.as_bytes(),
            _ => {
                return Err(AbiError::encode(format!(
                    "Expected {} value, got {}.",
                    self.kind.name(),
                    value.kind()
                )))
            }
        };
        let mut segment = Encoded::from_bytes(raw.to_vec());
        segment.pad_to_word();
        Ok(Encoded::descriptor(raw.len() as u64, segment))
    }

    pub fn decode(
        &self,
        config: &CoderConfig,
        bytes: &[u8],
        offset: usize,
        budget: &HeapBudget,
    ) -> AbiResult<(AbiValue, usize)> {
        let what = self.kind.name();
        let (pointer, length) = read_descriptor(config, bytes, offset, what)?;
        check_segment(bytes, pointer, Some(length), what)?;
        budget.charge(length, what)?;

        let raw = bytes[pointer..pointer + length].to_vec();
        let value = match self.kind {
            HeapKind::Bytes => AbiValue::Bytes(raw),
            HeapKind::String => AbiValue::Str(
                String::from_utf8(raw).map_err(|_| AbiError::decode("Invalid UTF-8 string data."))?,
            ),
        };
        Ok((value, offset + DESCRIPTOR_SIZE))
    }
}
