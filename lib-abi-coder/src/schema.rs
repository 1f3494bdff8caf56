//! JSON ABI schema definitions
//!
//! Defines the declarative structure a program's ABI is published in: type
//! declarations, function signatures, logged types and configurable
//! constants. The codec treats a parsed `JsonAbi` as opaque input; loading it
//! from disk is the caller's business.

use serde::{Deserialize, Serialize};

use crate::errors::{AbiError, AbiResult};

/// Complete program ABI
///
/// Types are referenced by `typeId` from every other section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct JsonAbi {
    /// All type declarations, primitives included
    pub types: Vec<TypeDeclaration>,

    /// Callable functions
    pub functions: Vec<FunctionDeclaration>,

    /// Types that can appear in receipts, keyed by log id
    #[serde(default)]
    pub logged_types: Vec<LoggedType>,

    /// Constants patched into the bytecode before submission
    #[serde(default)]
    pub configurables: Vec<ConfigurableDeclaration>,
}

/// A named type in the schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeDeclaration {
    /// Identifier referenced by type applications
    pub type_id: usize,

    /// Type string, e.g. `u64`, `struct Game`, `enum Option`, `[_; 4]`, `generic T`
    #[serde(rename = "type")]
    pub type_name: String,

    /// Fields, variants, tuple members or array element, in encoding order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<TypeApplication>>,

    /// `typeId`s of the `generic` parameters this type is declared over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_parameters: Option<Vec<usize>>,
}

/// A use of a declared type, with its generic arguments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeApplication {
    /// Field, variant or parameter name
    pub name: String,

    /// Referenced `typeId`
    #[serde(rename = "type")]
    pub type_id: usize,

    /// Arguments for the referenced type's generic parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_arguments: Option<Vec<TypeApplication>>,
}

/// Function signature
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionDeclaration {
    /// Function name, unique within the ABI
    pub name: String,

    /// Parameters in call order
    pub inputs: Vec<TypeApplication>,

    /// Return type
    pub output: TypeApplication,

    /// Compiler attributes (`storage`, `payable`, `doc-comment`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Attribute>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// Type emitted by a `log` instruction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoggedType {
    /// Log id as it appears in receipts
    pub log_id: String,

    pub logged_type: TypeApplication,
}

/// Configurable constant embedded in the bytecode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurableDeclaration {
    pub name: String,

    pub configurable_type: TypeApplication,

    /// Byte offset of the constant in the bytecode image
    pub offset: usize,
}

impl JsonAbi {
    /// Create an empty ABI
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an ABI from its JSON form
    pub fn from_json(json: &str) -> AbiResult<Self> {
        serde_json::from_str(json).map_err(|e| AbiError::schema(format!("Failed to parse ABI: {e}")))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> AbiResult<String> {
        serde_json::to_string(self).map_err(|e| AbiError::schema(format!("Failed to encode ABI: {e}")))
    }

    /// Add a type declaration
    pub fn with_type(mut self, declaration: TypeDeclaration) -> Self {
        self.types.push(declaration);
        self
    }

    /// Add a function
    pub fn with_function(mut self, function: FunctionDeclaration) -> Self {
        self.functions.push(function);
        self
    }

    /// Add a configurable constant
    pub fn with_configurable(mut self, configurable: ConfigurableDeclaration) -> Self {
        self.configurables.push(configurable);
        self
    }

    /// Add a logged type
    pub fn with_logged_type(mut self, logged: LoggedType) -> Self {
        self.logged_types.push(logged);
        self
    }

    pub fn type_declaration(&self, type_id: usize) -> Option<&TypeDeclaration> {
        self.types.iter().find(|t| t.type_id == type_id)
    }
}

impl TypeDeclaration {
    /// Declaration without components or generics
    pub fn new(type_id: usize, type_name: impl Into<String>) -> Self {
        Self {
            type_id,
            type_name: type_name.into(),
            components: None,
            type_parameters: None,
        }
    }

    pub fn with_components(mut self, components: Vec<TypeApplication>) -> Self {
        self.components = Some(components);
        self
    }

    pub fn with_type_parameters(mut self, parameters: Vec<usize>) -> Self {
        self.type_parameters = Some(parameters);
        self
    }

    pub fn components(&self) -> &[TypeApplication] {
        self.components.as_deref().unwrap_or(&[])
    }

    pub fn type_parameters(&self) -> &[usize] {
        self.type_parameters.as_deref().unwrap_or(&[])
    }
}

impl TypeApplication {
    pub fn new(name: impl Into<String>, type_id: usize) -> Self {
        Self {
            name: name.into(),
            type_id,
            type_arguments: None,
        }
    }

    pub fn with_type_arguments(mut self, arguments: Vec<TypeApplication>) -> Self {
        self.type_arguments = Some(arguments);
        self
    }

    pub fn type_arguments(&self) -> &[TypeApplication] {
        self.type_arguments.as_deref().unwrap_or(&[])
    }
}

impl FunctionDeclaration {
    pub fn new(name: impl Into<String>, output: TypeApplication) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            output,
            attributes: None,
        }
    }

    pub fn with_input(mut self, input: TypeApplication) -> Self {
        self.inputs.push(input);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abi_creation() {
        let abi = JsonAbi::new()
            .with_type(TypeDeclaration::new(0, "u64"))
            .with_function(
                FunctionDeclaration::new("get", TypeApplication::new("", 0))
                    .with_input(TypeApplication::new("key", 0)),
            );
        assert_eq!(abi.types.len(), 1);
        assert_eq!(abi.functions[0].inputs.len(), 1);
        assert!(abi.type_declaration(0).is_some());
        assert!(abi.type_declaration(1).is_none());
    }

    #[test]
    fn test_parse_camel_case_json() {
        let json = r#"{
            "types": [
                { "typeId": 0, "type": "u8", "components": null, "typeParameters": null },
                { "typeId": 1, "type": "enum Option", "components": [
                    { "name": "None", "type": 2 },
                    { "name": "Some", "type": 3 }
                ], "typeParameters": [3] },
                { "typeId": 2, "type": "()" },
                { "typeId": 3, "type": "generic T" }
            ],
            "functions": [{
                "name": "sum_optional_u8",
                "inputs": [
                    { "name": "a", "type": 1, "typeArguments": [{ "name": "", "type": 0 }] }
                ],
                "output": { "name": "", "type": 0 },
                "attributes": null
            }],
            "loggedTypes": [],
            "configurables": [
                { "name": "LIMIT", "configurableType": { "name": "", "type": 0 }, "offset": 48 }
            ]
        }"#;
        let abi = JsonAbi::from_json(json).expect("Should parse");
        assert_eq!(abi.types[1].type_parameters(), &[3]);
        assert_eq!(abi.functions[0].inputs[0].type_arguments()[0].type_id, 0);
        assert_eq!(abi.configurables[0].offset, 48);
    }

    #[test]
    fn test_optional_sections_default() {
        let abi = JsonAbi::from_json(r#"{ "types": [], "functions": [] }"#).unwrap();
        assert!(abi.logged_types.is_empty());
        assert!(abi.configurables.is_empty());
    }

    #[test]
    fn test_abi_serialization_round_trip() {
        let abi = JsonAbi::new().with_type(TypeDeclaration::new(0, "bool"));
        let json = abi.to_json().expect("Should serialize");
        assert!(json.contains("\"typeId\""));
        assert_eq!(JsonAbi::from_json(&json).unwrap(), abi);
    }

    #[test]
    fn test_malformed_json_is_schema_error() {
        assert!(matches!(JsonAbi::from_json("{"), Err(AbiError::Schema(_))));
    }
}
