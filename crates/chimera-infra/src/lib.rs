//! Infrastructure for Chimera: the filesystem contract store, the runtime
//! config loader and the built-in skill handlers.

pub mod config;
pub mod contract_store;
pub mod skills;
