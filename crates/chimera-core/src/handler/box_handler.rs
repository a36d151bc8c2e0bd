//! BoxSkillHandler -- object-safe dynamic dispatch wrapper for SkillHandler.
//!
//! 1. Define an object-safe `SkillHandlerDyn` trait with boxed futures
//! 2. Blanket-impl `SkillHandlerDyn` for all `T: SkillHandler`
//! 3. `BoxSkillHandler` wraps `Box<dyn SkillHandlerDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use chimera_types::Payload;
use chimera_types::error::HandlerError;

use super::SkillHandler;

/// Object-safe version of [`SkillHandler`] with boxed futures.
pub trait SkillHandlerDyn: Send + Sync {
    fn handle_boxed<'a>(
        &'a self,
        input: &'a Payload,
    ) -> Pin<Box<dyn Future<Output = Result<Payload, HandlerError>> + Send + 'a>>;
}

impl<T: SkillHandler> SkillHandlerDyn for T {
    fn handle_boxed<'a>(
        &'a self,
        input: &'a Payload,
    ) -> Pin<Box<dyn Future<Output = Result<Payload, HandlerError>> + Send + 'a>> {
        Box::pin(self.handle(input))
    }
}

/// Type-erased skill handler.
///
/// Since `SkillHandler` uses RPITIT it cannot be a trait object directly;
/// this wrapper provides the same call through `SkillHandlerDyn`.
pub struct BoxSkillHandler {
    inner: Box<dyn SkillHandlerDyn + Send + Sync>,
}

impl BoxSkillHandler {
    pub fn new<T: SkillHandler + 'static>(handler: T) -> Self {
        Self {
            inner: Box::new(handler),
        }
    }

    pub async fn handle(&self, input: &Payload) -> Result<Payload, HandlerError> {
        self.inner.handle_boxed(input).await
    }
}

impl std::fmt::Debug for BoxSkillHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxSkillHandler").finish_non_exhaustive()
    }
}
