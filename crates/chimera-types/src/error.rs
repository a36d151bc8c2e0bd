use thiserror::Error;

use crate::Payload;
use crate::validation::{Violation, summarize};

/// Errors raised while loading contract documents into the registry.
///
/// Any of these aborts registry initialization as a whole.
#[derive(Debug, Error)]
pub enum ContractLoadError {
    #[error("failed to read contract source '{origin}': {message}")]
    Io { origin: String, message: String },

    #[error("contract document '{origin}' is not valid JSON: {message}")]
    Parse { origin: String, message: String },

    #[error("contract document '{origin}' is malformed: {}", summarize(.violations))]
    Malformed {
        origin: String,
        violations: Vec<Violation>,
    },

    #[error("contract '{contract_id}' from '{origin}' is invalid: {reason}")]
    Invalid {
        origin: String,
        contract_id: String,
        reason: String,
    },

    #[error("duplicate contract id '{contract_id}' in '{origin}'")]
    DuplicateId { origin: String, contract_id: String },
}

/// Errors from registry lookups after initialization.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("contract '{skill_id}' not found")]
    NotFound { skill_id: String },

    #[error("failed to serialize contract '{skill_id}': {message}")]
    Serialization { skill_id: String, message: String },
}

/// A domain failure raised by a skill handler.
///
/// `code` is matched against the contract's declared failure modes; without
/// a matching code the failure surfaces as a generic internal error.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub code: Option<String>,
    pub message: String,
    pub details: Option<Payload>,
}

impl HandlerError {
    /// An uncoded failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            details: None,
        }
    }

    /// A failure carrying a code intended to match a declared failure mode.
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Payload) -> Self {
        self.details = Some(details);
        self
    }
}

/// The typed failure taxonomy of one invocation, before it is converted
/// into an error contract at the dispatcher boundary.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("skill '{skill_id}' not found")]
    SkillNotFound { skill_id: String },

    #[error("input for skill '{skill_id}' is invalid: {}", summarize(.violations))]
    InputValidation {
        skill_id: String,
        violations: Vec<Violation>,
    },

    #[error("skill '{skill_id}' has no registered handler")]
    NotImplemented { skill_id: String },

    #[error("handler for skill '{skill_id}' failed: {source}")]
    HandlerExecution {
        skill_id: String,
        #[source]
        source: HandlerError,
    },

    #[error("handler for skill '{skill_id}' timed out after {timeout_ms}ms")]
    HandlerTimeout { skill_id: String, timeout_ms: u64 },

    #[error("output of skill '{skill_id}' is invalid: {}", summarize(.violations))]
    OutputValidation {
        skill_id: String,
        violations: Vec<Violation>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ViolationReason;

    #[test]
    fn test_contract_load_error_display() {
        let err = ContractLoadError::DuplicateId {
            origin: "skills/b/contract.json".to_string(),
            contract_id: "skill_a_v1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate contract id 'skill_a_v1' in 'skills/b/contract.json'"
        );
    }

    #[test]
    fn test_malformed_error_lists_violations() {
        let err = ContractLoadError::Malformed {
            origin: "x.json".to_string(),
            violations: vec![Violation::new(
                "failure_modes",
                ViolationReason::MissingRequired,
                "required field is missing",
            )],
        };
        assert!(err.to_string().contains("failure_modes"));
    }

    #[test]
    fn test_handler_error_codes() {
        let err = HandlerError::with_code("RATE_LIMITED", "try later");
        assert_eq!(err.code.as_deref(), Some("RATE_LIMITED"));
        assert_eq!(err.to_string(), "try later");
        assert!(HandlerError::new("oops").code.is_none());
    }

    #[test]
    fn test_invocation_error_display() {
        let err = InvocationError::HandlerTimeout {
            skill_id: "skill_trend_scan_v1".to_string(),
            timeout_ms: 250,
        };
        assert!(err.to_string().contains("250ms"));
    }
}
