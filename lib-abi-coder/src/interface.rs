//! Program interface
//!
//! An [`Interface`] is built once per ABI and is read-only afterwards: it owns
//! the coder arena plus the resolved functions, configurables and logged
//! types, and any number of callers may encode and decode through a shared
//! reference. The only mutation it performs is on caller-owned bytecode in
//! [`Interface::set_configurable`].

use std::collections::HashMap;

use indexmap::IndexMap;
use lib_types::WORD_SIZE;

use crate::coders::{Coder, CoderArena, CoderId, Encoded, HeapBudget};
use crate::config::CoderConfig;
use crate::errors::{AbiError, AbiResult};
use crate::resolver::Resolver;
use crate::schema::{Attribute, JsonAbi};
use crate::signature::{function_signature, selector};
use crate::validation::AbiValidator;
use crate::value::AbiValue;

/// One resolved function parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInput {
    pub name: String,
    pub coder: CoderId,
    /// `Option<T>`: may be left out when trailing
    pub optional: bool,
}

/// A callable function with its coders, signature and selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionFragment {
    name: String,
    inputs: Vec<FunctionInput>,
    output: CoderId,
    signature: String,
    selector: [u8; WORD_SIZE],
    attributes: Vec<Attribute>,
}

impl FunctionFragment {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[FunctionInput] {
        &self.inputs
    }

    pub fn output(&self) -> CoderId {
        self.output
    }

    /// e.g. `transfer(u64,s(b256))`
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn selector(&self) -> [u8; WORD_SIZE] {
        self.selector
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Fewest arguments a call may supply
    fn min_arguments(&self, allow_omitted_options: bool) -> usize {
        if !allow_omitted_options {
            return self.inputs.len();
        }
        let omittable = self.inputs.iter().rev().take_while(|input| input.optional).count();
        self.inputs.len() - omittable
    }
}

/// A configurable constant: where it lives in the bytecode and how to encode it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurableFragment {
    pub name: String,
    pub coder: CoderId,
    pub offset: usize,
    /// Bytes overwritten at `offset`
    pub width: usize,
}

/// Resolved ABI of one program
#[derive(Debug, Clone)]
pub struct Interface {
    abi: JsonAbi,
    arena: CoderArena,
    functions: IndexMap<String, FunctionFragment>,
    configurables: IndexMap<String, ConfigurableFragment>,
    logs: HashMap<String, CoderId>,
}

impl Interface {
    /// Build an interface with the default [`CoderConfig`]
    pub fn new(abi: JsonAbi) -> AbiResult<Self> {
        Self::with_config(abi, CoderConfig::default())
    }

    pub fn with_config(abi: JsonAbi, config: CoderConfig) -> AbiResult<Self> {
        AbiValidator::validate(&abi)?;

        let mut resolver = Resolver::new(&abi, config);

        let mut functions = IndexMap::with_capacity(abi.functions.len());
        for function in &abi.functions {
            let mut inputs = Vec::with_capacity(function.inputs.len());
            let mut concrete = Vec::with_capacity(function.inputs.len());
            for input in &function.inputs {
                let resolved = resolver.resolve_application(input)?;
                let optional = matches!(
                    resolver.arena().get(resolved.coder)?,
                    Coder::Enum(coder) if coder.is_option()
                );
                inputs.push(FunctionInput {
                    name: input.name.clone(),
                    coder: resolved.coder,
                    optional,
                });
                concrete.push(resolved.concrete);
            }
            let output = resolver.resolve_application(&function.output)?.coder;
            let signature = function_signature(&resolver, &function.name, &concrete)?;

            functions.insert(
                function.name.clone(),
                FunctionFragment {
                    name: function.name.clone(),
                    inputs,
                    output,
                    selector: selector(&signature),
                    signature,
                    attributes: function.attributes.clone().unwrap_or_default(),
                },
            );
        }

        let mut configurables = IndexMap::with_capacity(abi.configurables.len());
        for configurable in &abi.configurables {
            let coder = resolver.resolve_application(&configurable.configurable_type)?.coder;
            // Heap pointers would be relative to the value, not the bytecode
            if resolver.arena().holds_heap(coder)? {
                return Err(AbiError::schema(format!(
                    "Configurable {} cannot hold heap data.",
                    configurable.name
                )));
            }
            let width = resolver.arena().width(coder)?;
            configurables.insert(
                configurable.name.clone(),
                ConfigurableFragment {
                    name: configurable.name.clone(),
                    coder,
                    offset: configurable.offset,
                    width,
                },
            );
        }

        let mut logs = HashMap::with_capacity(abi.logged_types.len());
        for logged in &abi.logged_types {
            let coder = resolver.resolve_application(&logged.logged_type)?.coder;
            logs.insert(logged.log_id.clone(), coder);
        }

        let arena = resolver.finish();
        tracing::debug!(
            "Built ABI interface: {} functions, {} configurables, {} logged types, {} coders",
            functions.len(),
            configurables.len(),
            logs.len(),
            arena.len()
        );

        Ok(Self {
            abi,
            arena,
            functions,
            configurables,
            logs,
        })
    }

    /// Parse a JSON ABI and build its interface
    pub fn from_json(json: &str) -> AbiResult<Self> {
        Self::new(JsonAbi::from_json(json)?)
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    pub fn arena(&self) -> &CoderArena {
        &self.arena
    }

    pub fn config(&self) -> &CoderConfig {
        self.arena.config()
    }

    /// Functions in declaration order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionFragment> {
        self.functions.values()
    }

    /// Configurable constants in declaration order
    pub fn configurables(&self) -> impl Iterator<Item = &ConfigurableFragment> {
        self.configurables.values()
    }

    pub fn has_configurables(&self) -> bool {
        !self.configurables.is_empty()
    }

    pub fn get_function(&self, name: &str) -> AbiResult<&FunctionFragment> {
        self.functions
            .get(name)
            .ok_or_else(|| AbiError::encode(format!("Function {name} not found.")))
    }

    pub fn get_configurable(&self, name: &str) -> AbiResult<&ConfigurableFragment> {
        self.configurables
            .get(name)
            .ok_or_else(|| AbiError::encode(format!("Configurable {name} not found.")))
    }

    fn encode_inputs(&self, function: &FunctionFragment, args: &[AbiValue]) -> AbiResult<Encoded> {
        let expected = function.inputs.len();
        let min = function.min_arguments(self.config().allow_omitted_options);
        if args.len() < min || args.len() > expected {
            return Err(AbiError::encode(format!(
                "Types/values length mismatch. Function {} takes {} arguments, got {}.",
                function.name,
                expected,
                args.len()
            )));
        }

        let none = AbiValue::none();
        let mut out = Encoded::new();
        for (index, input) in function.inputs.iter().enumerate() {
            let value = args.get(index).unwrap_or(&none);
            out.append(self.arena.encode_value(input.coder, value)?);
        }
        Ok(out)
    }

    /// Selector word followed by the arguments
    ///
    /// Heap pointers are offsets into the returned buffer, selector included.
    pub fn encode_function_call(&self, name: &str, args: &[AbiValue]) -> AbiResult<Vec<u8>> {
        let function = self.get_function(name)?;
        let encoded = self.encode_inputs(function, args)?;
        let mut out = function.selector.to_vec();
        out.extend(encoded.finish(WORD_SIZE));
        Ok(out)
    }

    /// Arguments alone, as script or predicate data
    pub fn encode_arguments(&self, name: &str, args: &[AbiValue]) -> AbiResult<Vec<u8>> {
        let function = self.get_function(name)?;
        Ok(self.encode_inputs(function, args)?.finish(0))
    }

    /// Inverse of [`encode_function_call`](Self::encode_function_call)
    pub fn decode_arguments(&self, name: &str, bytes: &[u8]) -> AbiResult<Vec<AbiValue>> {
        let function = self.get_function(name)?;
        match bytes.get(..WORD_SIZE) {
            Some(word) if word == function.selector.as_slice() => {}
            Some(_) => {
                return Err(AbiError::decode(format!(
                    "Invalid function selector for {}.",
                    function.name
                )))
            }
            None => return Err(AbiError::decode("Invalid function call data size.")),
        }

        let budget = HeapBudget::new(self.config().max_heap_length);
        let mut values = Vec::with_capacity(function.inputs.len());
        let mut offset = WORD_SIZE;
        for input in &function.inputs {
            let (value, next) = self.arena.decode_within(input.coder, bytes, offset, &budget)?;
            values.push(value);
            offset = next;
        }
        Ok(values)
    }

    pub fn decode_function_result(&self, name: &str, bytes: &[u8]) -> AbiResult<AbiValue> {
        let function = self.get_function(name)?;
        let (value, _) = self.arena.decode(function.output, bytes, 0)?;
        Ok(value)
    }

    /// Decode a value emitted by a `log` instruction
    pub fn decode_log(&self, bytes: &[u8], log_id: &str) -> AbiResult<AbiValue> {
        let coder = self
            .logs
            .get(log_id)
            .ok_or_else(|| AbiError::decode(format!("Log id {log_id} is not declared in the ABI.")))?;
        let (value, _) = self.arena.decode(*coder, bytes, 0)?;
        Ok(value)
    }

    pub fn encode_configurable(&self, name: &str, value: &AbiValue) -> AbiResult<Vec<u8>> {
        let configurable = self.get_configurable(name)?;
        self.arena.encode(configurable.coder, value)
    }

    /// Encode a configurable and check it fits an image of `image_len` bytes
    pub fn configurable_patch(
        &self,
        name: &str,
        value: &AbiValue,
        image_len: usize,
    ) -> AbiResult<(usize, Vec<u8>)> {
        let bytes = self.encode_configurable(name, value)?;
        let offset = self.get_configurable(name)?.offset;
        match offset.checked_add(bytes.len()) {
            Some(end) if end <= image_len => Ok((offset, bytes)),
            _ => Err(AbiError::encode(format!(
                "Configurable {name} at offset {offset} does not fit in {image_len} bytes of bytecode."
            ))),
        }
    }

    /// Overwrite a configurable constant in `bytecode`, in place
    ///
    /// Only `[offset, offset + width)` changes. Nothing is written if the
    /// value fails to encode or the slot runs past the image.
    pub fn set_configurable(&self, bytecode: &mut [u8], name: &str, value: &AbiValue) -> AbiResult<()> {
        let (offset, bytes) = self.configurable_patch(name, value, bytecode.len())?;
        bytecode[offset..offset + bytes.len()].copy_from_slice(&bytes);
        tracing::debug!("Set configurable {} at offset {} ({} bytes)", name, offset, bytes.len());
        Ok(())
    }
}
