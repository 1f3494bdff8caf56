//! Tagged unions (`enum`) and `Option`
//!
//! # Layout
//!
//! ```text
//! [ discriminant word ][ payload, right-padded to the widest variant ]
//! ```
//!
//! Every instance has the same stride, `8 + max(variant width)`, whatever
//! variant is active, so arrays and structs holding enums keep fixed offsets.
//! Variant order is fixed at construction; the discriminant is the variant's
//! declaration index.

use lib_types::WORD_SIZE;

use super::{read_word, CoderArena, CoderId, Encoded, HeapBudget};
use crate::errors::{AbiError, AbiResult};
use crate::value::AbiValue;

static UNIT: AbiValue = AbiValue::Unit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumCoder {
    name: String,
    variants: Vec<(String, CoderId)>,
    option: bool,
}

impl EnumCoder {
    pub fn new(name: impl Into<String>, variants: Vec<(String, CoderId)>) -> Self {
        Self {
            name: name.into(),
            variants,
            option: false,
        }
    }

    /// `Option<T>`: variants `None` (unit payload) and `Some` (wrapped type)
    pub fn option(none: CoderId, some: CoderId) -> Self {
        Self {
            name: "Option".to_string(),
            variants: vec![("None".to_string(), none), ("Some".to_string(), some)],
            option: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[(String, CoderId)] {
        &self.variants
    }

    pub fn is_option(&self) -> bool {
        self.option
    }

    /// Width of the uniform payload slot
    pub fn payload_width(&self, arena: &CoderArena) -> AbiResult<usize> {
        self.variants
            .iter()
            .map(|(_, coder)| arena.width(*coder))
            .try_fold(0, |max, width| width.map(|w| max.max(w)))
    }

    fn valid_cases(&self) -> String {
        self.variants
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Split a value into `(variant name, payload)`
    fn select<'v>(&self, value: &'v AbiValue) -> AbiResult<(&'v str, &'v AbiValue)> {
        match value {
            AbiValue::Enum { variant, value } => Ok((variant.as_str(), value.as_ref())),
            AbiValue::Option(Some(inner)) if self.option => Ok(("Some", inner.as_ref())),
            AbiValue::Option(None) if self.option => Ok(("None", &UNIT)),
            // unit variants may be named directly
            AbiValue::Str(variant) => Ok((variant.as_str(), &UNIT)),
            _ => Err(AbiError::encode(format!(
                "Invalid enum {}. Expected enum value, got {}.",
                self.name,
                value.kind()
            ))),
        }
    }

    pub fn encode(&self, arena: &CoderArena, value: &AbiValue) -> AbiResult<Encoded> {
        let (variant, payload) = self.select(value)?;
        let index = self
            .variants
            .iter()
            .position(|(name, _)| name == variant)
            .ok_or_else(|| {
                AbiError::encode(format!(
                    "Invalid case '{}'. Valid cases: {}.",
                    variant,
                    self.valid_cases()
                ))
            })?;

        let payload_width = self.payload_width(arena)?;
        let mut body = arena.encode_value(self.variants[index].1, payload)?;
        body.pad_to(payload_width);

        let mut out = Encoded::word(index as u64);
        out.append(body);
        Ok(out)
    }

    pub fn decode(
        &self,
        arena: &CoderArena,
        bytes: &[u8],
        offset: usize,
        budget: &HeapBudget,
    ) -> AbiResult<(AbiValue, usize)> {
        let stride = WORD_SIZE + self.payload_width(arena)?;
        let end = offset
            .checked_add(stride)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| AbiError::decode(format!("Invalid enum {} data size.", self.name)))?;

        let index = read_word(bytes, offset)
            .ok_or_else(|| AbiError::decode(format!("Invalid enum {} data size.", self.name)))?;
        let (variant, coder) = usize::try_from(index)
            .ok()
            .and_then(|i| self.variants.get(i))
            .ok_or_else(|| {
                AbiError::decode(format!(
                    "Invalid caseIndex '{}'. Valid cases: {}.",
                    index,
                    self.valid_cases()
                ))
            })?;

        // Read only the active variant's bytes; padding is skipped by `end`
        let (payload, _) = arena.decode_within(*coder, bytes, offset + WORD_SIZE, budget)?;

        let value = if self.option {
            match variant.as_str() {
                "None" => AbiValue::Option(None),
                _ => AbiValue::Option(Some(Box::new(payload))),
            }
        } else {
            AbiValue::Enum {
                variant: variant.clone(),
                value: Box::new(payload),
            }
        };
        Ok((value, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coders::{B256Coder, BooleanCoder, Coder, NumberCoder, NumberWidth};

    fn mixed_enum() -> (CoderArena, CoderId) {
        let mut arena = CoderArena::new();
        let u8c = arena.insert(Coder::Number(NumberCoder::new(NumberWidth::U8))).unwrap();
        let hash = arena.insert(Coder::Hash(B256Coder::new())).unwrap();
        let boolc = arena.insert(Coder::Boolean(BooleanCoder::new())).unwrap();
        let coder = EnumCoder::new(
            "Mixed",
            vec![("small".into(), u8c), ("big".into(), hash), ("flag".into(), boolc)],
        );
        let id = arena.insert(Coder::Enum(coder)).unwrap();
        (arena, id)
    }

    #[test]
    fn test_stride_uses_widest_variant() {
        let (arena, id) = mixed_enum();
        assert_eq!(arena.width(id).unwrap(), 8 + 32);

        let bytes = arena.encode(id, &AbiValue::variant("small", AbiValue::Number(9))).unwrap();
        assert_eq!(bytes.len(), 40);
        assert_eq!(&bytes[0..8], &[0u8; 8]);
        assert_eq!(bytes[15], 9);
        assert!(bytes[16..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_decode_advances_full_stride() {
        let (arena, id) = mixed_enum();
        let value = AbiValue::variant("flag", AbiValue::Bool(true));
        let mut bytes = arena.encode(id, &value).unwrap();
        bytes.extend_from_slice(&[0xaa; 8]);

        let (decoded, offset) = arena.decode(id, &bytes, 0).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(offset, 40);
    }

    #[test]
    fn test_unknown_variant() {
        let (arena, id) = mixed_enum();
        let err = arena.encode(id, &AbiValue::variant("huge", AbiValue::Unit)).unwrap_err();
        assert_eq!(
            err,
            AbiError::Encode("Invalid case 'huge'. Valid cases: small, big, flag.".into())
        );
    }

    #[test]
    fn test_discriminant_out_of_range() {
        let (arena, id) = mixed_enum();
        let mut bytes = vec![0u8; 40];
        bytes[7] = 3;
        let err = arena.decode(id, &bytes, 0).unwrap_err();
        assert_eq!(
            err,
            AbiError::Decode("Invalid caseIndex '3'. Valid cases: small, big, flag.".into())
        );
    }

    #[test]
    fn test_option() {
        let mut arena = CoderArena::new();
        let unit = arena.insert(Coder::unit()).unwrap();
        let u8c = arena.insert(Coder::Number(NumberCoder::new(NumberWidth::U8))).unwrap();
        let id = arena.insert(Coder::Enum(EnumCoder::option(unit, u8c))).unwrap();
        assert_eq!(arena.width(id).unwrap(), 16);

        let none = arena.encode(id, &AbiValue::none()).unwrap();
        assert_eq!(none, vec![0u8; 16]);
        assert_eq!(arena.decode(id, &none, 0).unwrap(), (AbiValue::none(), 16));

        let some = arena.encode(id, &AbiValue::some(AbiValue::Number(10))).unwrap();
        assert_eq!(some[7], 1);
        assert_eq!(some[15], 10);
        assert_eq!(
            arena.decode(id, &some, 0).unwrap(),
            (AbiValue::some(AbiValue::Number(10)), 16)
        );

        // the enum spelling is accepted too
        let spelled = arena.encode(id, &AbiValue::variant("Some", AbiValue::Number(10))).unwrap();
        assert_eq!(spelled, some);
    }

    #[test]
    fn test_unit_variant_by_name() {
        let mut arena = CoderArena::new();
        let unit = arena.insert(Coder::unit()).unwrap();
        let coder = EnumCoder::new(
            "State",
            vec![("Waiting".into(), unit), ("Playing".into(), unit)],
        );
        let id = arena.insert(Coder::Enum(coder)).unwrap();
        let bytes = arena.encode(id, &AbiValue::Str("Playing".into())).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0, 0, 0, 0, 1]);
    }
}
