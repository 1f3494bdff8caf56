//! Named-field structs
//!
//! Same layout as a tuple of the field coders; values are keyed by field
//! name. Missing fields fail the encode, extra keys are ignored.

use indexmap::IndexMap;

use super::{CoderArena, CoderId, Encoded, HeapBudget};
use crate::errors::{AbiError, AbiResult};
use crate::value::AbiValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructCoder {
    name: String,
    fields: Vec<(String, CoderId)>,
}

impl StructCoder {
    pub fn new(name: impl Into<String>, fields: Vec<(String, CoderId)>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, CoderId)] {
        &self.fields
    }

    pub fn encode(&self, arena: &CoderArena, value: &AbiValue) -> AbiResult<Encoded> {
        let AbiValue::Struct(map) = value else {
            return Err(AbiError::encode(format!(
                "Invalid struct {}. Expected object value, got {}.",
                self.name,
                value.kind()
            )));
        };

        let mut out = Encoded::new();
        for (field, coder) in &self.fields {
            let item = map.get(field).ok_or_else(|| {
                AbiError::encode(format!(
                    "Invalid struct {}. Field \"{}\" not present.",
                    self.name, field
                ))
            })?;
            let encoded = arena.encode_value(*coder, item).map_err(|e| match e {
                AbiError::Encode(msg) => AbiError::Encode(format!(
                    "Invalid struct {}. Field \"{}\": {}",
                    self.name, field, msg
                )),
                other => other,
            })?;
            out.append(encoded);
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
        let mut map = IndexMap::with_capacity(self.fields.len());
        let mut cursor = offset;
        for (field, coder) in &self.fields {
            let (item, next) = arena.decode_within(*coder, bytes, cursor, budget)?;
            map.insert(field.clone(), item);
            cursor = next;
        }
        Ok((AbiValue::Struct(map), cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coders::{ArrayCoder, BooleanCoder, Coder, NumberCoder, NumberWidth, VecCoder};

    fn game_ref() -> (CoderArena, CoderId) {
        let mut arena = CoderArena::new();
        let u64c = arena.insert(Coder::Number(NumberCoder::new(NumberWidth::U64))).unwrap();
        let u8c = arena.insert(Coder::Number(NumberCoder::new(NumberWidth::U8))).unwrap();
        let boolc = arena.insert(Coder::Boolean(BooleanCoder::new())).unwrap();
        let coder = StructCoder::new(
            "GameRef",
            vec![
                ("score".into(), u64c),
                ("ammo".into(), u8c),
                ("alive".into(), boolc),
            ],
        );
        let id = arena.insert(Coder::Struct(coder)).unwrap();
        (arena, id)
    }

    #[test]
    fn test_field_order_defines_layout() {
        let (arena, id) = game_ref();
        // keys given out of order; layout follows declaration
        let value = AbiValue::structure([
            ("alive", AbiValue::Bool(true)),
            ("score", AbiValue::Number(101)),
            ("ammo", AbiValue::Number(3)),
        ]);
        let bytes = arena.encode(id, &value).unwrap();
        assert_eq!(bytes.len(), 24);
        assert_eq!(bytes[7], 101);
        assert_eq!(bytes[15], 3);
        assert_eq!(bytes[23], 1);

        let (decoded, _) = arena.decode(id, &bytes, 0).unwrap();
        let AbiValue::Struct(map) = decoded else {
            panic!("expected struct");
        };
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["score", "ammo", "alive"]);
    }

    #[test]
    fn test_missing_field() {
        let (arena, id) = game_ref();
        let value = AbiValue::structure([
            ("score", AbiValue::Number(1)),
            ("ammo", AbiValue::Number(1)),
        ]);
        let err = arena.encode(id, &value).unwrap_err();
        assert_eq!(
            err,
            AbiError::Encode("Invalid struct GameRef. Field \"alive\" not present.".into())
        );
    }

    #[test]
    fn test_extra_keys_ignored() {
        let (arena, id) = game_ref();
        let value = AbiValue::structure([
            ("score", AbiValue::Number(1)),
            ("ammo", AbiValue::Number(1)),
            ("alive", AbiValue::Bool(false)),
            ("bonus", AbiValue::Number(9)),
        ]);
        assert_eq!(arena.encode(id, &value).unwrap().len(), 24);
    }

    #[test]
    fn test_field_error_names_field() {
        let (arena, id) = game_ref();
        let value = AbiValue::structure([
            ("score", AbiValue::Number(1)),
            ("ammo", AbiValue::Number(300)),
            ("alive", AbiValue::Bool(false)),
        ]);
        let err = arena.encode(id, &value).unwrap_err();
        assert!(err.message().contains("\"ammo\""));
    }

    #[test]
    fn test_third_field_failure_inside_containers() {
        let (mut arena, id) = game_ref();
        let pair = arena.insert(Coder::Array(ArrayCoder::new(id, 2))).unwrap();
        let list = arena.insert(Coder::Vector(VecCoder::new(id))).unwrap();

        let complete = AbiValue::structure([
            ("score", AbiValue::Number(5)),
            ("ammo", AbiValue::Number(2)),
            ("alive", AbiValue::Bool(true)),
        ]);
        let broken = AbiValue::structure([
            ("score", AbiValue::Number(7)),
            ("ammo", AbiValue::Number(1)),
        ]);
        let items = AbiValue::Array(vec![complete, broken]);
        let expected = AbiError::Encode("Invalid struct GameRef. Field \"alive\" not present.".into());

        assert_eq!(arena.encode_value(pair, &items).unwrap_err(), expected);
        assert_eq!(arena.encode(pair, &items).unwrap_err(), expected);
        assert_eq!(arena.encode(list, &items).unwrap_err(), expected);
    }
}
