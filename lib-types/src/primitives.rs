//! Canonical Primitive Types for the ABI Wire Format
//!
//! Rule: every scalar occupies exactly one word on the wire.
//!
//! These types are the building blocks shared by the coder crates. They are:
//! - Fixed-size (no dynamic allocation)
//! - Word-aligned when encoded
//! - Cheap to copy and compare

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ============================================================================
// WORD LAYOUT
// ============================================================================

/// The VM word, the atomic alignment unit of the encoding
pub type Word = u64;

/// Size of one word in bytes
pub const WORD_SIZE: usize = 8;

/// Size of a 256-bit hash in bytes
pub const B256_SIZE: usize = 32;

/// Round `len` up to the next word boundary
pub const fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD_SIZE) * WORD_SIZE
}

/// Encode a word as big-endian bytes
pub const fn word_to_bytes(word: Word) -> [u8; WORD_SIZE] {
    word.to_be_bytes()
}

// ============================================================================
// HASH TYPES
// ============================================================================

/// Error returned when parsing a `B256` from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum B256ParseError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid b256 length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// 32-byte hash (contract ids, asset ids, addresses, raw b256 values)
#[derive(Clone, Copy, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct B256(pub [u8; 32]);

impl B256 {
    /// Create a new B256 from raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a zeroed B256
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Get the underlying bytes
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse from hex, with or without a `0x` prefix
    pub fn from_hex(text: &str) -> Result<Self, B256ParseError> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        let bytes = hex::decode(digits).map_err(|e| B256ParseError::InvalidHex(e.to_string()))?;
        Self::try_from(bytes.as_slice())
    }

    /// `0x`-prefixed lowercase hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for B256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B256({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for B256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for B256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for B256 {
    type Error = B256ParseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| B256ParseError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

/// Serialised as its `0x`-prefixed hex string
impl Serialize for B256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for B256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        B256::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

impl AsRef<[u8]> for B256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
