//! Handler registry for runtime skill lookup.
//!
//! Built once at startup, then shared read-only with the dispatcher.

use std::collections::HashMap;

use super::SkillHandler;
use super::box_handler::BoxSkillHandler;

/// Skill handlers indexed by skill id.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, BoxSkillHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under the given skill id.
    ///
    /// If a handler with this id already exists, it is replaced.
    pub fn register<H: SkillHandler + 'static>(&mut self, skill_id: impl Into<String>, handler: H) {
        self.register_boxed(skill_id, BoxSkillHandler::new(handler));
    }

    pub fn register_boxed(&mut self, skill_id: impl Into<String>, handler: BoxSkillHandler) {
        let skill_id = skill_id.into();
        if self.handlers.insert(skill_id.clone(), handler).is_some() {
            tracing::debug!(skill_id = %skill_id, "Replaced skill handler");
        }
    }

    pub fn get(&self, skill_id: &str) -> Option<&BoxSkillHandler> {
        self.handlers.get(skill_id)
    }

    pub fn contains(&self, skill_id: &str) -> bool {
        self.handlers.contains_key(skill_id)
    }

    /// All registered skill ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
