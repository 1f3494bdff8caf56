//! Schema resolver: JSON ABI type applications to coders
//!
//! Resolution runs in two steps. A [`TypeApplication`] is first concretised
//! into a [`ConcreteType`]: generic parameters are substituted and anonymous
//! arrays and tuples carry their (substituted) components as arguments, so
//! the key fully identifies the layout. Coders are then built per concrete
//! type and memoised, which shares one coder between repeated references and
//! lets a recursive definition find its own reserved slot.

use std::collections::HashMap;

use crate::coders::{
    ArrayCoder, B256Coder, BooleanCoder, ByteArrayCoder, Coder, CoderArena, CoderId, EnumCoder,
    HeapBytesCoder, HeapKind, NumberCoder, NumberWidth, StructCoder, TupleCoder, VecCoder,
};
use crate::config::CoderConfig;
use crate::errors::{AbiError, AbiResult};
use crate::schema::{JsonAbi, TypeApplication, TypeDeclaration};

/// Shape of a declared type, parsed from its type string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Number(NumberWidth),
    Bool,
    B256,
    Unit,
    RawPtr,
    Str(usize),
    Array(usize),
    Tuple,
    Vec,
    Bytes,
    String,
    Option,
    Struct(String),
    Enum(String),
    Generic(String),
}

impl TypeShape {
    pub fn parse(type_name: &str) -> AbiResult<Self> {
        let name = type_name.trim();
        if let Some(width) = NumberWidth::from_type_name(name) {
            return Ok(TypeShape::Number(width));
        }
        let shape = match name {
            "bool" => TypeShape::Bool,
            "b256" => TypeShape::B256,
            "()" => TypeShape::Unit,
            "raw untyped ptr" => TypeShape::RawPtr,
            _ => {
                if let Some(rest) = name.strip_prefix("str[").and_then(|r| r.strip_suffix(']')) {
                    TypeShape::Str(Self::parse_length(rest, type_name)?)
                } else if let Some(rest) = name.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
                    let length = rest
                        .rsplit_once(';')
                        .map(|(_, n)| n)
                        .ok_or_else(|| AbiError::schema(format!("Invalid array type: {type_name}")))?;
                    TypeShape::Array(Self::parse_length(length, type_name)?)
                } else if name.starts_with('(') && name.ends_with(')') {
                    TypeShape::Tuple
                } else if let Some(path) = name.strip_prefix("struct ") {
                    match Self::last_segment(path) {
                        "Vec" => TypeShape::Vec,
                        "Bytes" => TypeShape::Bytes,
                        "String" => TypeShape::String,
                        other => TypeShape::Struct(other.to_string()),
                    }
                } else if let Some(path) = name.strip_prefix("enum ") {
                    match Self::last_segment(path) {
                        "Option" => TypeShape::Option,
                        other => TypeShape::Enum(other.to_string()),
                    }
                } else if let Some(param) = name.strip_prefix("generic ") {
                    TypeShape::Generic(param.trim().to_string())
                } else {
                    return Err(AbiError::schema(format!("Unsupported type: {type_name}")));
                }
            }
        };
        Ok(shape)
    }

    fn parse_length(text: &str, type_name: &str) -> AbiResult<usize> {
        text.trim()
            .parse()
            .map_err(|_| AbiError::schema(format!("Invalid length in type: {type_name}")))
    }

    /// `std::vec::Vec` and `Vec` name the same type
    fn last_segment(path: &str) -> &str {
        path.rsplit("::").next().unwrap_or(path).trim()
    }
}

/// A type application with every generic parameter substituted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcreteType {
    pub type_id: usize,
    /// Bound generic parameters, or the components of an array or tuple
    pub args: Vec<ConcreteType>,
}

impl ConcreteType {
    pub fn depth(&self) -> usize {
        1 + self.args.iter().map(ConcreteType::depth).max().unwrap_or(0)
    }
}

/// A resolved type application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub coder: CoderId,
    pub concrete: ConcreteType,
}

type Bindings = HashMap<usize, ConcreteType>;

/// Builds a coder arena from a validated ABI
pub struct Resolver<'a> {
    abi: &'a JsonAbi,
    declarations: HashMap<usize, &'a TypeDeclaration>,
    arena: CoderArena,
    memo: HashMap<ConcreteType, CoderId>,
}

impl<'a> Resolver<'a> {
    pub fn new(abi: &'a JsonAbi, config: CoderConfig) -> Self {
        Self {
            abi,
            declarations: abi.types.iter().map(|t| (t.type_id, t)).collect(),
            arena: CoderArena::with_config(config),
            memo: HashMap::new(),
        }
    }

    pub fn abi(&self) -> &'a JsonAbi {
        self.abi
    }

    pub fn declaration(&self, type_id: usize) -> AbiResult<&'a TypeDeclaration> {
        self.declarations
            .get(&type_id)
            .copied()
            .ok_or_else(|| AbiError::schema(format!("Type id {type_id} is not declared.")))
    }

    pub fn arena(&self) -> &CoderArena {
        &self.arena
    }

    /// Resolve a top-level application (function input/output, log, configurable)
    pub fn resolve_application(&mut self, application: &TypeApplication) -> AbiResult<ResolvedType> {
        let concrete = self.concretise(application, &Bindings::new())?;
        let coder = self.resolve(&concrete)?;
        Ok(ResolvedType { coder, concrete })
    }

    /// Give up the builder, keeping the finished arena
    pub fn finish(self) -> CoderArena {
        self.arena
    }

    pub(crate) fn concretise(
        &self,
        application: &TypeApplication,
        bindings: &HashMap<usize, ConcreteType>,
    ) -> AbiResult<ConcreteType> {
        let declaration = self.declaration(application.type_id)?;
        let shape = TypeShape::parse(&declaration.type_name)?;

        let args = match shape {
            TypeShape::Generic(param) => {
                return bindings.get(&application.type_id).cloned().ok_or_else(|| {
                    AbiError::schema(format!("Unresolved generic parameter {param}."))
                });
            }
            TypeShape::Array(_) | TypeShape::Tuple => declaration
                .components()
                .iter()
                .map(|component| self.concretise(component, bindings))
                .collect::<AbiResult<Vec<_>>>()?,
            _ => {
                let expected = declaration.type_parameters().len();
                let given = application.type_arguments();
                if given.len() != expected {
                    return Err(AbiError::schema(format!(
                        "{} expects {} type arguments, got {}.",
                        declaration.type_name,
                        expected,
                        given.len()
                    )));
                }
                given
                    .iter()
                    .map(|argument| self.concretise(argument, bindings))
                    .collect::<AbiResult<Vec<_>>>()?
            }
        };

        let concrete = ConcreteType {
            type_id: application.type_id,
            args,
        };
        let max_depth = self.arena.config().max_type_depth;
        if concrete.depth() > max_depth {
            return Err(AbiError::schema(format!(
                "Type {} nests deeper than {max_depth} levels.",
                declaration.type_name
            )));
        }
        Ok(concrete)
    }

    /// Generic parameter bindings of a declaration instantiated as `ty`
    fn bindings(&self, declaration: &TypeDeclaration, ty: &ConcreteType) -> Bindings {
        declaration
            .type_parameters()
            .iter()
            .copied()
            .zip(ty.args.iter().cloned())
            .collect()
    }

    fn resolve(&mut self, ty: &ConcreteType) -> AbiResult<CoderId> {
        if let Some(id) = self.memo.get(ty) {
            tracing::trace!("resolver memo hit for type {} -> coder #{}", ty.type_id, id.index());
            return Ok(*id);
        }

        let declaration = self.declaration(ty.type_id)?;
        let shape = TypeShape::parse(&declaration.type_name)?;

        let coder = match shape {
            TypeShape::Number(width) => Coder::Number(NumberCoder::new(width)),
            TypeShape::RawPtr => Coder::Number(NumberCoder::new(NumberWidth::U64)),
            TypeShape::Bool => Coder::Boolean(BooleanCoder::new()),
            TypeShape::B256 => Coder::Hash(B256Coder::new()),
            TypeShape::Unit => Coder::unit(),
            TypeShape::Str(length) => Coder::FixedBytes(ByteArrayCoder::text(length)),
            TypeShape::Array(length) => {
                let element = ty.args.first().ok_or_else(|| {
                    AbiError::schema(format!("{} has no element type.", declaration.type_name))
                })?;
                Coder::Array(ArrayCoder::new(self.resolve(element)?, length))
            }
            TypeShape::Tuple => {
                let components = ty
                    .args
                    .iter()
                    .map(|component| self.resolve(component))
                    .collect::<AbiResult<Vec<_>>>()?;
                Coder::Tuple(TupleCoder::new(components))
            }
            TypeShape::Vec => {
                let element = ty
                    .args
                    .first()
                    .ok_or_else(|| AbiError::schema("Vec requires one type argument."))?;
                // the element may be a struct still under construction
                Coder::Vector(VecCoder::new(self.resolve(element)?))
            }
            TypeShape::Bytes => Coder::String(HeapBytesCoder::new(HeapKind::Bytes)),
            TypeShape::String => Coder::String(HeapBytesCoder::new(HeapKind::String)),
            TypeShape::Option | TypeShape::Struct(_) | TypeShape::Enum(_) => {
                return self.resolve_named(ty, declaration, shape);
            }
            TypeShape::Generic(param) => {
                return Err(AbiError::schema(format!("Unresolved generic parameter {param}.")));
            }
        };

        let id = self.arena.insert(coder)?;
        self.memo.insert(ty.clone(), id);
        Ok(id)
    }

    /// Structs and enums reserve their slot first so they can refer to themselves
    fn resolve_named(
        &mut self,
        ty: &ConcreteType,
        declaration: &TypeDeclaration,
        shape: TypeShape,
    ) -> AbiResult<CoderId> {
        let slot = self.arena.reserve();
        self.memo.insert(ty.clone(), slot);
        tracing::trace!("reserved coder #{} for {}", slot.index(), declaration.type_name);

        let bindings = self.bindings(declaration, ty);
        let mut components = Vec::with_capacity(declaration.components().len());
        for component in declaration.components() {
            let concrete = self.concretise(component, &bindings)?;
            components.push((component.name.clone(), self.resolve(&concrete)?));
        }

        let coder = match shape {
            TypeShape::Option => {
                let none = Self::variant(&components, "None")?;
                let some = Self::variant(&components, "Some")?;
                Coder::Enum(EnumCoder::option(none, some))
            }
            TypeShape::Enum(name) => Coder::Enum(EnumCoder::new(name, components)),
            TypeShape::Struct(name) => Coder::Struct(StructCoder::new(name, components)),
            _ => return Err(AbiError::schema(format!("{} is not a named type.", declaration.type_name))),
        };
        self.arena.fill(slot, coder)?;
        Ok(slot)
    }

    fn variant(components: &[(String, CoderId)], name: &str) -> AbiResult<CoderId> {
        components
            .iter()
            .find(|(variant, _)| variant == name)
            .map(|(_, id)| *id)
            .ok_or_else(|| AbiError::schema(format!("Option has no {name} variant.")))
    }
}
