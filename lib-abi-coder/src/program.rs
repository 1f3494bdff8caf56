//! Program bytecode bound to its interface

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use crate::errors::AbiResult;
use crate::interface::Interface;
use crate::value::AbiValue;

/// Name of a script's entry function
pub const MAIN_FUNCTION: &str = "main";

/// Executable image (script or predicate) plus the ABI it was built with
#[derive(Debug, Clone)]
pub struct ProgramImage {
    bytecode: Vec<u8>,
    interface: Arc<Interface>,
}

impl ProgramImage {
    pub fn new(bytecode: Vec<u8>, interface: Arc<Interface>) -> Self {
        Self { bytecode, interface }
    }

    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    pub fn into_bytecode(self) -> Vec<u8> {
        self.bytecode
    }

    pub fn interface(&self) -> &Arc<Interface> {
        &self.interface
    }

    /// Patch configurable constants into the bytecode
    ///
    /// Every value is encoded and bounds-checked first; the image is only
    /// touched once all of them are known to fit.
    pub fn set_configurable_constants<'v, I>(&mut self, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (&'v str, &'v AbiValue)>,
    {
        let patches = self
            .prepare_patches(values)
            .map_err(|e| anyhow!("Error setting configurable: {e:#}"))?;

        for (name, offset, bytes) in patches {
            self.bytecode[offset..offset + bytes.len()].copy_from_slice(&bytes);
            tracing::debug!("Set configurable {} at offset {} ({} bytes)", name, offset, bytes.len());
        }
        Ok(self)
    }

    fn prepare_patches<'v, I>(&self, values: I) -> Result<Vec<(&'v str, usize, Vec<u8>)>>
    where
        I: IntoIterator<Item = (&'v str, &'v AbiValue)>,
    {
        if !self.interface.has_configurables() {
            return Err(anyhow!("Program has no configurable constants to be set"));
        }

        let mut patches = Vec::new();
        for (name, value) in values {
            if self.interface.get_configurable(name).is_err() {
                return Err(anyhow!("Program has no configurable constant named: {name}"));
            }
            let (offset, bytes) = self
                .interface
                .configurable_patch(name, value, self.bytecode.len())
                .with_context(|| format!("Invalid value for {name}"))?;
            patches.push((name, offset, bytes));
        }
        Ok(patches)
    }

    /// Encode the arguments of the program's `main` function
    pub fn encode_main_data(&self, args: &[AbiValue]) -> AbiResult<Vec<u8>> {
        self.interface.encode_arguments(MAIN_FUNCTION, args)
    }

    /// Decode the value returned by `main`
    pub fn decode_main_result(&self, bytes: &[u8]) -> AbiResult<AbiValue> {
        self.interface.decode_function_result(MAIN_FUNCTION, bytes)
    }
}
