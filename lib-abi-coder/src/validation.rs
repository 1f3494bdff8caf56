//! ABI validation
//!
//! Structural checks run before any coder is built, so the resolver can
//! assume every `typeId` it follows is declared.

use std::collections::HashSet;

use super::errors::{AbiError, AbiResult};
use super::schema::*;

/// ABI validator
pub struct AbiValidator;

impl AbiValidator {
    /// Validate that an ABI is well-formed
    pub fn validate(abi: &JsonAbi) -> AbiResult<()> {
        let ids = Self::validate_types(&abi.types)?;
        Self::validate_functions(&abi.functions, &ids)?;
        Self::validate_configurables(&abi.configurables, &ids)?;
        Self::validate_logged_types(&abi.logged_types, &ids)?;
        Ok(())
    }

    fn validate_types(types: &[TypeDeclaration]) -> AbiResult<HashSet<usize>> {
        let mut ids = HashSet::new();
        for declaration in types {
            if !ids.insert(declaration.type_id) {
                return Err(AbiError::schema(format!(
                    "Duplicate type id {} ({})",
                    declaration.type_id, declaration.type_name
                )));
            }
        }

        for declaration in types {
            let name = &declaration.type_name;
            if name.starts_with("enum ") && declaration.components().is_empty() {
                return Err(AbiError::schema(format!("Enum '{name}' has no variants")));
            }

            let mut field_names = HashSet::new();
            for component in declaration.components() {
                if name.starts_with("struct ") || name.starts_with("enum ") {
                    if !field_names.insert(component.name.as_str()) {
                        return Err(AbiError::schema(format!(
                            "Duplicate component '{}' in '{name}'",
                            component.name
                        )));
                    }
                }
                Self::validate_application(component, &ids, name)?;
            }

            for parameter in declaration.type_parameters() {
                let is_generic = types
                    .iter()
                    .find(|t| t.type_id == *parameter)
                    .is_some_and(|t| t.type_name.starts_with("generic "));
                if !is_generic {
                    return Err(AbiError::schema(format!(
                        "Type parameter {parameter} of '{name}' is not a generic type"
                    )));
                }
            }
        }
        Ok(ids)
    }

    fn validate_application(
        application: &TypeApplication,
        ids: &HashSet<usize>,
        context: &str,
    ) -> AbiResult<()> {
        if !ids.contains(&application.type_id) {
            return Err(AbiError::schema(format!(
                "Unknown type id {} referenced by '{context}'",
                application.type_id
            )));
        }
        for argument in application.type_arguments() {
            Self::validate_application(argument, ids, context)?;
        }
        Ok(())
    }

    fn validate_functions(functions: &[FunctionDeclaration], ids: &HashSet<usize>) -> AbiResult<()> {
        // Overloading is not supported: one name, one signature
        let mut names = HashSet::new();
        for function in functions {
            if !names.insert(function.name.as_str()) {
                return Err(AbiError::schema(format!(
                    "Duplicate function name: {}",
                    function.name
                )));
            }
            Self::validate_identifier(&function.name, "function")?;

            let mut params = HashSet::new();
            for input in &function.inputs {
                if !params.insert(input.name.as_str()) {
                    return Err(AbiError::schema(format!(
                        "Duplicate parameter name '{}' in function '{}'",
                        input.name, function.name
                    )));
                }
                Self::validate_application(input, ids, &function.name)?;
            }
            Self::validate_application(&function.output, ids, &function.name)?;
        }
        Ok(())
    }

    fn validate_configurables(
        configurables: &[ConfigurableDeclaration],
        ids: &HashSet<usize>,
    ) -> AbiResult<()> {
        let mut names = HashSet::new();
        for configurable in configurables {
            if !names.insert(configurable.name.as_str()) {
                return Err(AbiError::schema(format!(
                    "Duplicate configurable name: {}",
                    configurable.name
                )));
            }
            Self::validate_application(&configurable.configurable_type, ids, &configurable.name)?;
        }
        Ok(())
    }

    fn validate_logged_types(logged: &[LoggedType], ids: &HashSet<usize>) -> AbiResult<()> {
        let mut log_ids = HashSet::new();
        for entry in logged {
            if !log_ids.insert(entry.log_id.as_str()) {
                return Err(AbiError::schema(format!("Duplicate log id: {}", entry.log_id)));
            }
            Self::validate_application(&entry.logged_type, ids, &entry.log_id)?;
        }
        Ok(())
    }

    /// Names must be plain identifiers: selectors are hashed from them
    fn validate_identifier(name: &str, kind: &str) -> AbiResult<()> {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return Err(AbiError::schema(format!("{kind} name cannot be empty")));
        };
        if !first.is_alphabetic() && first != '_' {
            return Err(AbiError::schema(format!(
                "Invalid {kind} name '{name}': must start with letter or underscore"
            )));
        }
        if !chars.all(|c| c.is_alphanumeric() || c == '_') {
            return Err(AbiError::schema(format!(
                "Invalid {kind} name '{name}': must contain only alphanumeric and underscore characters"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> JsonAbi {
        JsonAbi::new()
            .with_type(TypeDeclaration::new(0, "u64"))
            .with_type(TypeDeclaration::new(1, "()"))
    }

    #[test]
    fn test_valid_abi() {
        let abi = base().with_function(
            FunctionDeclaration::new("get", TypeApplication::new("", 1))
                .with_input(TypeApplication::new("id", 0)),
        );
        assert!(AbiValidator::validate(&abi).is_ok());
    }

    #[test]
    fn test_duplicate_type_id() {
        let abi = base().with_type(TypeDeclaration::new(0, "bool"));
        assert!(AbiValidator::validate(&abi).is_err());
    }

    #[test]
    fn test_duplicate_function_name() {
        // same name, different arity: still rejected
        let abi = base()
            .with_function(FunctionDeclaration::new("f", TypeApplication::new("", 1)))
            .with_function(
                FunctionDeclaration::new("f", TypeApplication::new("", 1))
                    .with_input(TypeApplication::new("x", 0)),
            );
        let err = AbiValidator::validate(&abi).unwrap_err();
        assert!(err.message().contains("Duplicate function name"));
    }

    #[test]
    fn test_unknown_type_reference() {
        let abi = base().with_function(
            FunctionDeclaration::new("f", TypeApplication::new("", 1))
                .with_input(TypeApplication::new("x", 9)),
        );
        let err = AbiValidator::validate(&abi).unwrap_err();
        assert!(err.message().contains("Unknown type id 9"));
    }

    #[test]
    fn test_empty_enum() {
        let abi = base().with_type(TypeDeclaration::new(2, "enum Empty").with_components(vec![]));
        assert!(AbiValidator::validate(&abi).is_err());
    }

    #[test]
    fn test_duplicate_struct_field() {
        let abi = base().with_type(TypeDeclaration::new(2, "struct Pair").with_components(vec![
            TypeApplication::new("a", 0),
            TypeApplication::new("a", 0),
        ]));
        assert!(AbiValidator::validate(&abi).is_err());
    }

    #[test]
    fn test_type_parameter_must_be_generic() {
        let abi = base().with_type(
            TypeDeclaration::new(2, "struct Wrap")
                .with_components(vec![TypeApplication::new("inner", 0)])
                .with_type_parameters(vec![0]),
        );
        assert!(AbiValidator::validate(&abi).is_err());
    }

    #[test]
    fn test_duplicate_configurable_and_log_id() {
        let configurable = ConfigurableDeclaration {
            name: "FEE".into(),
            configurable_type: TypeApplication::new("", 0),
            offset: 8,
        };
        let abi = base()
            .with_configurable(configurable.clone())
            .with_configurable(configurable);
        assert!(AbiValidator::validate(&abi).is_err());

        let logged = LoggedType {
            log_id: "0".into(),
            logged_type: TypeApplication::new("", 0),
        };
        let abi = base().with_logged_type(logged.clone()).with_logged_type(logged);
        assert!(AbiValidator::validate(&abi).is_err());
    }

    #[test]
    fn test_invalid_function_identifier() {
        let abi = base().with_function(FunctionDeclaration::new("1st", TypeApplication::new("", 1)));
        assert!(AbiValidator::validate(&abi).is_err());
    }
}
