//! Skill contract loading and lookup.
//!
//! Contract documents are validated against the contract-of-contracts in
//! [`shape`] and cached by id in a read-only [`registry::ContractRegistry`].
//! Where documents come from is an infrastructure concern; this module only
//! sees already-read JSON values.

pub mod registry;
pub mod shape;

pub use registry::{ContractDocument, ContractRegistry};
