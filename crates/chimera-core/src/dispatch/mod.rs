//! Skill invocation: the dispatcher and its per-call state machine.

pub mod dispatcher;
pub mod failure;
pub mod invocation;

pub use dispatcher::{Dispatcher, stamp};
pub use failure::error_contract_for;
pub use invocation::Invocation;
