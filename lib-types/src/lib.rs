//! ABI wire primitives.
//! Stable, protocol-neutral, behavior-free.
//!
//! Rule: everything on the wire is word-aligned. No exceptions.

pub mod primitives;

pub use primitives::{
    padded_len, word_to_bytes, B256, B256ParseError, Word, B256_SIZE, WORD_SIZE,
};
