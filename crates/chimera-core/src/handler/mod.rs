//! Skill handler trait and the handler lookup table.
//!
//! A handler is the domain logic behind one skill id. The dispatcher knows
//! nothing about how handlers work, only that each takes a validated input
//! object and returns an output object or a [`HandlerError`].
//!
//! Uses RPITIT for `handle`; [`box_handler::BoxSkillHandler`] erases the
//! concrete type so handlers of different types can share one registry.

pub mod box_handler;
pub mod registry;

use std::future::Future;

use chimera_types::Payload;
use chimera_types::error::HandlerError;

pub use box_handler::BoxSkillHandler;
pub use registry::HandlerRegistry;

/// Domain logic for one skill.
pub trait SkillHandler: Send + Sync {
    /// Run the skill on an input that already passed the contract's
    /// input schema.
    fn handle(
        &self,
        input: &Payload,
    ) -> impl Future<Output = Result<Payload, HandlerError>> + Send;
}

/// A handler backed by an async closure.
///
/// The closure receives an owned copy of the input.
pub struct FnHandler<F> {
    f: F,
}

/// Wrap an async closure as a [`SkillHandler`].
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Payload) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Payload, HandlerError>> + Send,
{
    FnHandler { f }
}

impl<F, Fut> SkillHandler for FnHandler<F>
where
    F: Fn(Payload) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Payload, HandlerError>> + Send,
{
    fn handle(
        &self,
        input: &Payload,
    ) -> impl Future<Output = Result<Payload, HandlerError>> + Send {
        (self.f)(input.clone())
    }
}
