//! Skill contracts, payload validation and invocation dispatch for Chimera.
//!
//! This crate owns the runtime's behavior but performs no IO of its own:
//! contract documents are handed in already parsed, and handlers are
//! registered by the caller. Loading from disk lives in `chimera-infra`.

pub mod contract;
pub mod dispatch;
pub mod handler;
pub mod schema;
