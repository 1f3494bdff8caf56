//! Typed values carried across the encode/decode boundary

use indexmap::IndexMap;
use lib_types::B256;
use serde::{Deserialize, Serialize};

/// A structured value of some ABI type
///
/// Decoded values own all their data; nothing borrows from the input buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbiValue {
    /// The unit type `()`
    Unit,
    /// Any of `u8`, `u16`, `u32`, `u64`
    Number(u64),
    Bool(bool),
    B256(B256),
    /// Fixed `[u8; N]` blocks and heap `Bytes`
    Bytes(Vec<u8>),
    /// Fixed `str[N]` and heap `String`
    Str(String),
    /// Fixed arrays and vectors
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
    /// Named fields, kept in declaration order when decoded
    Struct(IndexMap<String, AbiValue>),
    /// A single active variant of a tagged union
    Enum {
        variant: String,
        value: Box<AbiValue>,
    },
    Option(Option<Box<AbiValue>>),
    /// Present bitfield entries as `(bit, value)`, in canonical order
    Bitfield(Vec<(u32, AbiValue)>),
}

impl AbiValue {
    /// Build a struct value from `(field, value)` pairs
    pub fn structure<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AbiValue)>,
    {
        AbiValue::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build an enum value with the given active variant
    pub fn variant(name: impl Into<String>, value: AbiValue) -> Self {
        AbiValue::Enum {
            variant: name.into(),
            value: Box::new(value),
        }
    }

    pub fn some(value: AbiValue) -> Self {
        AbiValue::Option(Some(Box::new(value)))
    }

    pub fn none() -> Self {
        AbiValue::Option(None)
    }

    /// Positional elements, for anything sequence-shaped
    pub fn as_sequence(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(items) | AbiValue::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<u64> {
        match self {
            AbiValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Short name of the value's shape, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Unit => "unit",
            AbiValue::Number(_) => "number",
            AbiValue::Bool(_) => "bool",
            AbiValue::B256(_) => "b256",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::Str(_) => "string",
            AbiValue::Array(_) => "array",
            AbiValue::Tuple(_) => "tuple",
            AbiValue::Struct(_) => "struct",
            AbiValue::Enum { .. } => "enum",
            AbiValue::Option(_) => "option",
            AbiValue::Bitfield(_) => "bitfield",
        }
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for AbiValue {
                fn from(n: $t) -> Self {
                    AbiValue::Number(u64::from(n))
                }
            }
        )*
    };
}

impl_from_number!(u8, u16, u32, u64);

impl From<bool> for AbiValue {
    fn from(b: bool) -> Self {
        AbiValue::Bool(b)
    }
}

impl From<B256> for AbiValue {
    fn from(hash: B256) -> Self {
        AbiValue::B256(hash)
    }
}

impl From<&str> for AbiValue {
    fn from(s: &str) -> Self {
        AbiValue::Str(s.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(s: String) -> Self {
        AbiValue::Str(s)
    }
}

impl From<Vec<AbiValue>> for AbiValue {
    fn from(items: Vec<AbiValue>) -> Self {
        AbiValue::Array(items)
    }
}

impl<T: Into<AbiValue>> From<Option<T>> for AbiValue {
    fn from(value: Option<T>) -> Self {
        AbiValue::Option(value.map(|v| Box::new(v.into())))
    }
}
