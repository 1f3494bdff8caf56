//! Function signatures and call selectors
//!
//! A signature is `name(arg,...)` with each argument written in the compact
//! type grammar the runtime hashes:
//!
//! | Type | Signature |
//! |------|-----------|
//! | `u8`..`u64`, `bool`, `b256`, `()` | as declared |
//! | `str[N]` | `str[N]` |
//! | `[T; N]` | `a[T;N]` |
//! | `(A, B)` | `(A,B)` |
//! | `struct S<T>` | `s<T>(field,...)` |
//! | `enum E<T>` | `e<T>(variant,...)` |
//! | `Vec<T>` | `s<T>(s<T>(rawptr,u64),u64)` |
//! | `Bytes` | `s(s(rawptr,u64),u64)` |
//! | `String` | `s(s(s(rawptr,u64),u64))` |
//!
//! The selector is the first four bytes of the SHA-256 of the signature,
//! right-aligned in one word.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::errors::{AbiError, AbiResult};
use crate::resolver::{ConcreteType, Resolver, TypeShape};
use lib_types::WORD_SIZE;

const RAW_VEC: &str = "s(rawptr,u64)";

/// Call selector for a signature
pub fn selector(signature: &str) -> [u8; WORD_SIZE] {
    let digest = Sha256::digest(signature.as_bytes());
    let mut word = [0u8; WORD_SIZE];
    word[4..].copy_from_slice(&digest[..4]);
    word
}

/// `name(arg,...)` for a function whose inputs are already concretised
pub fn function_signature(
    resolver: &Resolver<'_>,
    name: &str,
    inputs: &[ConcreteType],
) -> AbiResult<String> {
    let args = inputs
        .iter()
        .map(|input| type_signature(resolver, input))
        .collect::<AbiResult<Vec<_>>>()?;
    Ok(format!("{name}({})", args.join(",")))
}

/// Signature fragment of one concrete type
pub fn type_signature(resolver: &Resolver<'_>, ty: &ConcreteType) -> AbiResult<String> {
    SignatureWriter {
        resolver,
        active: Vec::new(),
    }
    .write(ty)
}

struct SignatureWriter<'r, 'a> {
    resolver: &'r Resolver<'a>,
    /// Named types currently being expanded
    active: Vec<ConcreteType>,
}

impl SignatureWriter<'_, '_> {
    fn write(&mut self, ty: &ConcreteType) -> AbiResult<String> {
        let declaration = self.resolver.declaration(ty.type_id)?;
        let shape = TypeShape::parse(&declaration.type_name)?;

        let signature = match shape {
            TypeShape::Number(width) => width.name().to_string(),
            TypeShape::Bool => "bool".to_string(),
            TypeShape::B256 => "b256".to_string(),
            TypeShape::Unit => "()".to_string(),
            TypeShape::RawPtr => "rawptr".to_string(),
            TypeShape::Str(length) => format!("str[{length}]"),
            TypeShape::Array(length) => {
                let element = self.args(ty)?;
                format!("a[{};{length}]", element.join(","))
            }
            TypeShape::Tuple => format!("({})", self.args(ty)?.join(",")),
            TypeShape::Vec => {
                let generics = self.generics(ty)?;
                format!("s{generics}(s{generics}({RAW_VEC},u64),u64)")
            }
            TypeShape::Bytes => format!("s({RAW_VEC},u64)"),
            TypeShape::String => format!("s(s({RAW_VEC},u64))"),
            TypeShape::Option | TypeShape::Enum(_) => self.named('e', ty, &shape)?,
            TypeShape::Struct(_) => self.named('s', ty, &shape)?,
            TypeShape::Generic(param) => {
                return Err(AbiError::schema(format!("Unresolved generic parameter {param}.")))
            }
        };
        Ok(signature)
    }

    fn args(&mut self, ty: &ConcreteType) -> AbiResult<Vec<String>> {
        ty.args.iter().map(|arg| self.write(arg)).collect()
    }

    fn generics(&mut self, ty: &ConcreteType) -> AbiResult<String> {
        if ty.args.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("<{}>", self.args(ty)?.join(",")))
    }

    fn named(&mut self, prefix: char, ty: &ConcreteType, shape: &TypeShape) -> AbiResult<String> {
        let generics = self.generics(ty)?;

        // A type reached again through its own fields is written by name
        if self.active.contains(ty) {
            let name = match shape {
                TypeShape::Struct(name) | TypeShape::Enum(name) => name.as_str(),
                _ => "Option",
            };
            return Ok(format!("{prefix}:{name}{generics}"));
        }

        let declaration = self.resolver.declaration(ty.type_id)?;
        let bindings: HashMap<usize, ConcreteType> = declaration
            .type_parameters()
            .iter()
            .copied()
            .zip(ty.args.iter().cloned())
            .collect();

        self.active.push(ty.clone());
        let mut components = Vec::with_capacity(declaration.components().len());
        for component in declaration.components() {
            let concrete = self.resolver.concretise(component, &bindings)?;
            components.push(self.write(&concrete)?);
        }
        self.active.pop();

        Ok(format!("{prefix}{generics}({})", components.join(",")))
    }
}
