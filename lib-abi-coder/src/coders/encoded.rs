//! Encoded buffers with deferred heap segments
//!
//! Coders produce an `Encoded`: the in-place bytes of a value plus the heap
//! segments referenced from descriptor slots inside those bytes. Pointers are
//! only known once every static region of the top-level value is laid out,
//! so they are patched in `finish`.
//!
//! # Layout
//!
//! ```text
//! [ top-level in-place bytes ][ segment 0 ][ segment 0 heap ][ segment 1 ] ...
//! ```

use lib_types::{padded_len, word_to_bytes, Word, WORD_SIZE};

/// A heap segment owed to the descriptor whose pointer word sits at `slot`
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeapSegment {
    slot: usize,
    data: Encoded,
}

/// In-place bytes plus the out-of-line data they point to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoded {
    bytes: Vec<u8>,
    heap: Vec<HeapSegment>,
}

impl Encoded {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes with no heap references
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes, heap: Vec::new() }
    }

    /// One big-endian word
    pub fn word(value: Word) -> Self {
        Self::from_bytes(word_to_bytes(value).to_vec())
    }

    /// A `[pointer, length, capacity]` descriptor owning `data` on the heap
    pub fn descriptor(length: Word, data: Encoded) -> Self {
        let mut bytes = Vec::with_capacity(3 * WORD_SIZE);
        bytes.extend_from_slice(&word_to_bytes(0)); // patched in finish
        bytes.extend_from_slice(&word_to_bytes(length));
        bytes.extend_from_slice(&word_to_bytes(length));
        Self {
            bytes,
            heap: vec![HeapSegment { slot: 0, data }],
        }
    }

    /// In-place length, excluding heap segments
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() && self.heap.is_empty()
    }

    /// Append another value's in-place bytes, carrying its heap segments along
    pub fn append(&mut self, other: Encoded) {
        let base = self.bytes.len();
        self.bytes.extend_from_slice(&other.bytes);
        self.heap.extend(other.heap.into_iter().map(|seg| HeapSegment {
            slot: seg.slot + base,
            data: seg.data,
        }));
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Zero-pad the in-place bytes on the right up to `len`
    pub fn pad_to(&mut self, len: usize) {
        if self.bytes.len() < len {
            self.bytes.resize(len, 0);
        }
    }

    /// Zero-pad the in-place bytes to the next word boundary
    pub fn pad_to_word(&mut self) {
        self.pad_to(padded_len(self.bytes.len()));
    }

    /// Lay out heap segments and patch pointers.
    ///
    /// `base` is the absolute position of the first byte, so a value placed
    /// after a call selector produces pointers into the full call buffer.
    pub fn finish(self, base: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bytes.len());
        self.write_into(&mut out, base);
        out
    }

    fn write_into(self, out: &mut Vec<u8>, base: usize) {
        let start = out.len();
        out.extend_from_slice(&self.bytes);
        for seg in self.heap {
            let pointer = (base + out.len()) as Word;
            let at = start + seg.slot;
            out[at..at + WORD_SIZE].copy_from_slice(&word_to_bytes(pointer));
            seg.data.write_into(out, base);
        }
    }
}
