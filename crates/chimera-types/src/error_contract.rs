//! The structured, versioned error object returned for failed invocations.
//!
//! Every failure the dispatcher surfaces, whatever stage it came from, is an
//! [`ErrorContract`]. Callers get the same shape regardless of origin and can
//! use `retryable` to decide whether to resubmit.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Payload;
use crate::contract::SkillContract;

/// Protocol version of the runtime's contract semantics.
///
/// Also the `spec_version` reported on errors raised before any contract
/// could be resolved.
pub const RUNTIME_SPEC_VERSION: &str = "1.0.0";

/// `contract_version` reported on errors raised before any contract could be
/// resolved.
pub const UNRESOLVED_CONTRACT_VERSION: &str = "0.0.0";

/// Error codes raised by the runtime itself.
///
/// Handler failures matched to a declared failure mode surface that mode's
/// code instead, so `ErrorContract::error_code` is a free string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    SkillNotFound,
    InputValidationError,
    SkillNotImplemented,
    InternalError,
    OutputValidationError,
    HandlerTimeout,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SkillNotFound => "SKILL_NOT_FOUND",
            Self::InputValidationError => "INPUT_VALIDATION_ERROR",
            Self::SkillNotImplemented => "SKILL_NOT_IMPLEMENTED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::OutputValidationError => "OUTPUT_VALIDATION_ERROR",
            Self::HandlerTimeout => "HANDLER_TIMEOUT",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.as_str().to_owned()
    }
}

/// A failed invocation, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorContract {
    pub error_code: String,
    pub error_message: String,
    pub spec_version: String,
    pub contract_version: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Payload>,
}

impl ErrorContract {
    /// Build an error contract stamped with `contract`'s versions, or with the
    /// runtime default pair when no contract was resolved.
    ///
    /// The timestamp is taken at construction.
    pub fn new(
        error_code: impl Into<String>,
        error_message: impl Into<String>,
        contract: Option<&SkillContract>,
        retryable: bool,
        details: Option<Payload>,
    ) -> Self {
        let (spec_version, contract_version) = match contract {
            Some(c) => (c.spec_version.clone(), c.version.clone()),
            None => (
                RUNTIME_SPEC_VERSION.to_owned(),
                UNRESOLVED_CONTRACT_VERSION.to_owned(),
            ),
        };

        Self {
            error_code: error_code.into(),
            error_message: error_message.into(),
            spec_version,
            contract_version,
            timestamp: Utc::now(),
            retryable: Some(retryable),
            details,
        }
    }

    /// Whether the caller may resubmit. Absent means no.
    pub fn is_retryable(&self) -> bool {
        self.retryable.unwrap_or(false)
    }

    /// Serialize into a plain JSON object for the caller.
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("error_code".into(), Value::String(self.error_code.clone()));
        payload.insert(
            "error_message".into(),
            Value::String(self.error_message.clone()),
        );
        payload.insert(
            "spec_version".into(),
            Value::String(self.spec_version.clone()),
        );
        payload.insert(
            "contract_version".into(),
            Value::String(self.contract_version.clone()),
        );
        payload.insert(
            "timestamp".into(),
            Value::String(self.timestamp.to_rfc3339()),
        );
        if let Some(retryable) = self.retryable {
            payload.insert("retryable".into(), Value::Bool(retryable));
        }
        if let Some(ref details) = self.details {
            payload.insert("details".into(), Value::Object(details.clone()));
        }
        payload
    }
}

impl fmt::Display for ErrorContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_code, self.error_message)
    }
}

impl std::error::Error for ErrorContract {}
