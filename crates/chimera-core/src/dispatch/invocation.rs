//! Per-call invocation state.
//!
//! An [`Invocation`] lives for exactly one dispatcher call. Its terminal
//! transitions consume it, so each invocation reaches `Complete` or `Failed`
//! exactly once.

use std::sync::Arc;
use std::time::Instant;

use chimera_types::Payload;
use chimera_types::contract::SkillContract;
use chimera_types::error::InvocationError;
use chimera_types::error_contract::ErrorContract;
use chimera_types::invocation::{InvocationRecord, InvocationState};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::failure::error_contract_for;

/// One end-to-end execution of the dispatch pipeline.
#[derive(Debug)]
pub struct Invocation<'a> {
    id: Uuid,
    skill_id: &'a str,
    input: &'a Payload,
    contract: Option<Arc<SkillContract>>,
    state: InvocationState,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl<'a> Invocation<'a> {
    pub fn new(skill_id: &'a str, input: &'a Payload) -> Self {
        Self {
            id: Uuid::now_v7(),
            skill_id,
            input,
            contract: None,
            state: InvocationState::Pending,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn skill_id(&self) -> &'a str {
        self.skill_id
    }

    pub fn input(&self) -> &'a Payload {
        self.input
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    pub fn contract(&self) -> Option<&SkillContract> {
        self.contract.as_deref()
    }

    /// Attach the resolved contract and move to `Resolved`.
    pub fn resolve(&mut self, contract: Arc<SkillContract>) {
        self.contract = Some(contract);
        self.advance(InvocationState::Resolved);
    }

    /// Move to the next non-terminal stage.
    pub fn advance(&mut self, next: InvocationState) {
        debug_assert!(
            self.state.can_transition_to(next) && !next.is_terminal(),
            "illegal invocation transition {} -> {next}",
            self.state
        );
        tracing::trace!(from = %self.state, to = %next, "Invocation state transition");
        self.state = next;
    }

    /// Finish successfully with the stamped output.
    pub fn complete(self, output: Payload) -> (Result<Payload, ErrorContract>, InvocationRecord) {
        let record = self.finish(InvocationState::Complete, None);
        (Ok(output), record)
    }

    /// Finish with a failure, converting it into the caller-facing error
    /// contract.
    pub fn fail(self, error: InvocationError) -> (Result<Payload, ErrorContract>, InvocationRecord) {
        let contract = error_contract_for(&error, self.contract());
        let record = self.finish(InvocationState::Failed, Some(contract.error_code.clone()));
        (Err(contract), record)
    }

    fn finish(self, terminal: InvocationState, error_code: Option<String>) -> InvocationRecord {
        debug_assert!(self.state.can_transition_to(terminal));
        InvocationRecord {
            invocation_id: self.id,
            skill_id: self.skill_id.to_owned(),
            state: terminal,
            last_stage: self.state,
            error_code,
            started_at: self.started_at,
            duration_ms: u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}
