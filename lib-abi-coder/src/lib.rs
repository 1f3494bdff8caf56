//! ABI Coder
//!
//! Converts typed values to and from the word-aligned binary encoding the VM
//! consumes, and builds a callable [`Interface`] from a JSON ABI.
//!
//! # Key Rules
//!
//! 1. **Word alignment**: every scalar takes one 8-byte big-endian word
//! 2. **Uniform enum stride**: discriminant word plus the widest variant, whatever is active
//! 3. **Heap after static**: vectors and strings are 3-word descriptors in place, data after the top-level value
//! 4. **Immutable coders**: an interface is built once and shared read-only
//!
//! # Module Structure
//!
//! - `coders/` - the closed coder set and the arena owning it
//! - `schema.rs` - JSON ABI documents
//! - `validation.rs` - structural ABI checks
//! - `resolver.rs` - type applications to memoised coders
//! - `signature.rs` - function signatures and call selectors
//! - `interface.rs` - per-function encode/decode, logs, configurables
//! - `program.rs` - bytecode image with configurable patching
//!
//! # Usage
//!
//! ```ignore
//! use lib_abi_coder::{AbiValue, Interface};
//!
//! let interface = Interface::from_json(&abi_json)?;
//! let call = interface.encode_function_call("transfer", &[AbiValue::Number(100)])?;
//! ```

pub mod coders;
pub mod config;
pub mod errors;
pub mod interface;
pub mod program;
pub mod resolver;
pub mod schema;
pub mod signature;
pub mod validation;
pub mod value;

pub use coders::{
    BitfieldCoder, BitfieldField, Coder, CoderArena, CoderId, Encoded, HeapBudget, NumberWidth,
};
pub use config::CoderConfig;
pub use errors::{AbiError, AbiResult};
pub use interface::{ConfigurableFragment, FunctionFragment, FunctionInput, Interface};
pub use program::ProgramImage;
pub use schema::JsonAbi;
pub use signature::selector;
pub use validation::AbiValidator;
pub use value::AbiValue;
