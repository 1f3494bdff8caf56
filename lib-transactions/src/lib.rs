//! Transaction encoding
//!
//! # Key Rules
//!
//! 1. **Mask carried elsewhere**: the policy bitmask lives in the transaction header, not next to the policy values
//! 2. **Canonical order**: present policies are written by ascending bit, whatever order they are supplied in
//! 3. **No placeholders**: absent policies take no bytes
//!
//! # Usage
//!
//! ```ignore
//! use lib_transactions::{policy_types, PoliciesCoder, Policy};
//!
//! let policies = [Policy::MaxFee(10_000), Policy::Maturity(5)];
//! let coder = PoliciesCoder::new()?;
//! let header_mask = policy_types(&policies);
//! let bytes = coder.encode(&policies)?;
//! let (decoded, _) = coder.decode(&bytes, 0, header_mask)?;
//! ```

pub mod errors;
pub mod policy;

pub use errors::{PolicyError, PolicyResult};
pub use policy::{policy_types, PoliciesCoder, Policy, PolicyType};
