//! Shared domain types for the Chimera skill runtime.
//!
//! This crate contains the core domain types used across the runtime:
//! skill contracts and their schemas, validation violations, the structured
//! error contract, invocation lifecycle states, runtime configuration, and
//! the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod contract;
pub mod error;
pub mod error_contract;
pub mod invocation;
pub mod validation;

/// A JSON object payload: skill input, skill output, or error details.
pub type Payload = serde_json::Map<String, serde_json::Value>;
