//! Built-in reference skills.

pub mod trend_scan;
pub mod write_post;

use chimera_core::handler::HandlerRegistry;

pub use trend_scan::{TrendScanHandler, fetch_trends};
pub use write_post::WritePostHandler;

/// A handler registry with every built-in skill registered.
pub fn builtin_handlers() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register(write_post::SKILL_ID, WritePostHandler);
    registry.register(trend_scan::SKILL_ID, TrendScanHandler);
    registry
}
