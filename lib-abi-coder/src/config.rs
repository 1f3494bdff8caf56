//! Coder configuration

use serde::{Deserialize, Serialize};

/// Tunables shared by the coder arena and the interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoderConfig {
    /// Most heap elements and bytes one decoded value may carry, summed over
    /// every descriptor it contains
    pub max_heap_length: u64,
    /// Deepest generic instantiation the resolver will follow
    pub max_type_depth: usize,
    /// Trailing `Option` parameters may be left out of a call
    pub allow_omitted_options: bool,
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self {
            max_heap_length: 1_048_576, // 1 Mi elements
            max_type_depth: 64,
            allow_omitted_options: true,
        }
    }
}
