//! Coders and the arena that owns them
//!
//! The coder set is closed: every type shape maps to one [`Coder`] variant
//! and all dispatch goes through a single `match`. Compound coders refer to
//! their children by [`CoderId`] into a [`CoderArena`], which lets recursive
//! schemas share one coder per type instead of unrolling.
//!
//! # Module Structure
//!
//! - `number.rs`, `boolean.rs`, `b256.rs`, `byte_array.rs` - one-word and fixed-block scalars
//! - `array.rs`, `tuple.rs`, `structure.rs` - fixed-shape composites
//! - `enumeration.rs` - tagged unions and `Option`
//! - `heap.rs` - vectors, `Bytes` and `String` behind a 3-word descriptor
//! - `bitfield.rs` - mask-selected optional fields
//! - `encoded.rs` - in-place bytes plus deferred heap segments

pub mod array;
pub mod b256;
pub mod bitfield;
pub mod boolean;
pub mod byte_array;
pub mod encoded;
pub mod enumeration;
pub mod heap;
pub mod number;
pub mod structure;
pub mod tuple;

pub use array::ArrayCoder;
pub use b256::B256Coder;
pub use bitfield::{BitfieldCoder, BitfieldField};
pub use boolean::BooleanCoder;
pub use byte_array::ByteArrayCoder;
pub use encoded::Encoded;
pub use enumeration::EnumCoder;
pub use heap::{HeapBudget, HeapBytesCoder, HeapKind, VecCoder, DESCRIPTOR_SIZE};
pub use number::{NumberCoder, NumberWidth};
pub use structure::StructCoder;
pub use tuple::TupleCoder;

use lib_types::{Word, B256_SIZE, WORD_SIZE};

use crate::config::CoderConfig;
use crate::errors::{AbiError, AbiResult};
use crate::value::AbiValue;

/// Read one big-endian word at `offset`, if the buffer holds it
pub(crate) fn read_word(bytes: &[u8], offset: usize) -> Option<Word> {
    let end = offset.checked_add(WORD_SIZE)?;
    let word: [u8; WORD_SIZE] = bytes.get(offset..end)?.try_into().ok()?;
    Some(Word::from_be_bytes(word))
}

/// Handle to a coder stored in a [`CoderArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoderId(usize);

impl CoderId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One coder per type shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coder {
    Number(NumberCoder),
    Boolean(BooleanCoder),
    Hash(B256Coder),
    FixedBytes(ByteArrayCoder),
    Array(ArrayCoder),
    Tuple(TupleCoder),
    Struct(StructCoder),
    Enum(EnumCoder),
    Vector(VecCoder),
    String(HeapBytesCoder),
    Bitfield(BitfieldCoder),
}

impl Coder {
    /// The unit type `()`, a zero-width tuple
    pub fn unit() -> Self {
        Coder::Tuple(TupleCoder::new(Vec::new()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Coder::Number(_) => "number",
            Coder::Boolean(_) => "boolean",
            Coder::Hash(_) => "b256",
            Coder::FixedBytes(_) => "fixed bytes",
            Coder::Array(_) => "array",
            Coder::Tuple(_) => "tuple",
            Coder::Struct(_) => "struct",
            Coder::Enum(_) => "enum",
            Coder::Vector(_) => "vector",
            Coder::String(_) => "string",
            Coder::Bitfield(_) => "bitfield",
        }
    }

    /// Child coders referenced by this one
    pub fn children(&self) -> Vec<CoderId> {
        match self {
            Coder::Number(_) | Coder::Boolean(_) | Coder::Hash(_) | Coder::FixedBytes(_) => {
                Vec::new()
            }
            Coder::String(_) => Vec::new(),
            Coder::Array(c) => vec![c.element()],
            Coder::Tuple(c) => c.components().to_vec(),
            Coder::Struct(c) => c.fields().iter().map(|(_, id)| *id).collect(),
            Coder::Enum(c) => c.variants().iter().map(|(_, id)| *id).collect(),
            Coder::Vector(c) => vec![c.element()],
            Coder::Bitfield(c) => c.fields().iter().map(|f| f.coder).collect(),
        }
    }

    /// In-place width, or `None` for the variable-length bitfield
    fn compute_width(&self, arena: &CoderArena) -> AbiResult<Option<usize>> {
        let width = match self {
            Coder::Number(_) | Coder::Boolean(_) => WORD_SIZE,
            Coder::Hash(_) => B256_SIZE,
            Coder::FixedBytes(c) => c.encoded_width(),
            Coder::Array(c) => arena
                .width(c.element())?
                .checked_mul(c.length())
                .ok_or_else(|| AbiError::schema("Array width overflows usize."))?,
            Coder::Tuple(c) => arena.sum_widths(c.components().iter().copied())?,
            Coder::Struct(c) => arena.sum_widths(c.fields().iter().map(|(_, id)| *id))?,
            Coder::Enum(c) => WORD_SIZE + c.payload_width(arena)?,
            Coder::Vector(c) => {
                if let Some(Coder::Bitfield(_)) = arena.slot(c.element())?.coder {
                    return Err(AbiError::schema("Bitfield coder cannot be a vector element."));
                }
                DESCRIPTOR_SIZE
            }
            Coder::String(_) => DESCRIPTOR_SIZE,
            Coder::Bitfield(c) => {
                for field in c.fields() {
                    arena.width(field.coder)?;
                }
                return Ok(None);
            }
        };
        Ok(Some(width))
    }

    fn encode(&self, arena: &CoderArena, value: &AbiValue) -> AbiResult<Encoded> {
        match self {
            Coder::Number(c) => c.encode(value).map(Encoded::from_bytes),
            Coder::Boolean(c) => c.encode(value).map(Encoded::from_bytes),
            Coder::Hash(c) => c.encode(value).map(Encoded::from_bytes),
            Coder::FixedBytes(c) => c.encode(value).map(Encoded::from_bytes),
            Coder::Array(c) => c.encode(arena, value),
            Coder::Tuple(c) => c.encode(arena, value),
            Coder::Struct(c) => c.encode(arena, value),
            Coder::Enum(c) => c.encode(arena, value),
            Coder::Vector(c) => c.encode(arena, value),
            Coder::String(c) => c.encode(value),
            Coder::Bitfield(c) => c.encode(arena, value),
        }
    }

    fn decode(
        &self,
        arena: &CoderArena,
        bytes: &[u8],
        offset: usize,
        budget: &HeapBudget,
    ) -> AbiResult<(AbiValue, usize)> {
        match self {
            Coder::Number(c) => c.decode(bytes, offset),
            Coder::Boolean(c) => c.decode(bytes, offset),
            Coder::Hash(c) => c.decode(bytes, offset),
            Coder::FixedBytes(c) => c.decode(bytes, offset),
            Coder::Array(c) => c.decode(arena, bytes, offset, budget),
            Coder::Tuple(c) => c.decode(arena, bytes, offset, budget),
            Coder::Struct(c) => c.decode(arena, bytes, offset, budget),
            Coder::Enum(c) => c.decode(arena, bytes, offset, budget),
            Coder::Vector(c) => c.decode(arena, bytes, offset, budget),
            Coder::String(c) => c.decode(arena.config(), bytes, offset, budget),
            Coder::Bitfield(c) => c.decode(arena, bytes, offset, budget),
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    coder: Option<Coder>,
    width: Option<usize>,
}

/// Owner of a coder tree
///
/// Coders are immutable once filled; the arena holds no per-call state, so a
/// shared reference can serve any number of concurrent encode/decode calls.
#[derive(Debug, Clone, Default)]
pub struct CoderArena {
    slots: Vec<Slot>,
    config: CoderConfig,
}

impl CoderArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoderConfig) -> Self {
        Self {
            slots: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &CoderConfig {
        &self.config
    }

    /// Number of slots, filled or reserved
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Store a coder whose children are already in the arena
    pub fn insert(&mut self, coder: Coder) -> AbiResult<CoderId> {
        let width = coder.compute_width(self)?;
        let id = CoderId(self.slots.len());
        self.slots.push(Slot {
            coder: Some(coder),
            width,
        });
        Ok(id)
    }

    /// Reserve a slot for a coder that may refer to itself
    pub fn reserve(&mut self) -> CoderId {
        let id = CoderId(self.slots.len());
        self.slots.push(Slot {
            coder: None,
            width: None,
        });
        id
    }

    /// Fill a reserved slot
    ///
    /// Fails if the coder reaches its own slot without passing through a heap
    /// descriptor, since such a layout would be infinitely wide.
    pub fn fill(&mut self, id: CoderId, coder: Coder) -> AbiResult<()> {
        match self.slots.get(id.0) {
            Some(slot) if slot.coder.is_none() => {}
            Some(_) => return Err(AbiError::schema(format!("Coder #{} is already defined.", id.0))),
            None => return Err(AbiError::schema(format!("Unknown coder #{}.", id.0))),
        }
        let width = coder.compute_width(self)?;
        self.slots[id.0] = Slot {
            coder: Some(coder),
            width,
        };
        Ok(())
    }

    fn slot(&self, id: CoderId) -> AbiResult<&Slot> {
        self.slots
            .get(id.0)
            .ok_or_else(|| AbiError::schema(format!("Unknown coder #{}.", id.0)))
    }

    pub fn get(&self, id: CoderId) -> AbiResult<&Coder> {
        self.slot(id)?
            .coder
            .as_ref()
            .ok_or_else(|| AbiError::schema(format!("Coder #{} is not yet defined.", id.0)))
    }

    /// Static in-place width of a coder
    pub fn width(&self, id: CoderId) -> AbiResult<usize> {
        let slot = self.slot(id)?;
        match (&slot.coder, slot.width) {
            (Some(_), Some(width)) => Ok(width),
            (Some(_), None) => Err(AbiError::schema(
                "Bitfield coder has no static width and cannot be nested.",
            )),
            (None, _) => Err(AbiError::schema(format!(
                "Coder #{} is infinitely sized: recursive without heap indirection.",
                id.0
            ))),
        }
    }

    /// Whether a coder's encoding carries heap data outside its own width
    pub fn holds_heap(&self, id: CoderId) -> AbiResult<bool> {
        let coder = self.get(id)?;
        if matches!(coder, Coder::Vector(_) | Coder::String(_)) {
            return Ok(true);
        }
        for child in coder.children() {
            if self.holds_heap(child)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn sum_widths(&self, ids: impl Iterator<Item = CoderId>) -> AbiResult<usize> {
        ids.map(|id| self.width(id)).sum()
    }

    /// Encode a value into a standalone buffer
    pub fn encode(&self, id: CoderId, value: &AbiValue) -> AbiResult<Vec<u8>> {
        Ok(self.encode_value(id, value)?.finish(0))
    }

    /// Encode a value, leaving heap pointers to be patched by the caller
    pub fn encode_value(&self, id: CoderId, value: &AbiValue) -> AbiResult<Encoded> {
        self.get(id)?.encode(self, value)
    }

    /// Decode one value at `offset`, returning it with the advanced offset
    ///
    /// Heap data produced by the whole value is capped by
    /// [`CoderConfig::max_heap_length`].
    pub fn decode(&self, id: CoderId, bytes: &[u8], offset: usize) -> AbiResult<(AbiValue, usize)> {
        let budget = HeapBudget::new(self.config.max_heap_length);
        self.decode_within(id, bytes, offset, &budget)
    }

    /// Decode against a heap budget shared with other values
    pub fn decode_within(
        &self,
        id: CoderId,
        bytes: &[u8],
        offset: usize,
        budget: &HeapBudget,
    ) -> AbiResult<(AbiValue, usize)> {
        self.get(id)?.decode(self, bytes, offset, budget)
    }
}
