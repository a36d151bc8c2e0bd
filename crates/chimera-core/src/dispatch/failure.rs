//! Conversion of typed invocation failures into error contracts.
//!
//! Validation-class failures are never retryable. Handler failures take
//! their code and retryability from the matching declared failure mode, and
//! fall back to `INTERNAL_ERROR` when nothing matches.

use chimera_types::Payload;
use chimera_types::contract::SkillContract;
use chimera_types::error::InvocationError;
use chimera_types::error_contract::{ErrorCode, ErrorContract};
use chimera_types::validation::Violation;
use serde_json::Value;

fn violation_details(violations: &[Violation]) -> Payload {
    let mut details = Payload::new();
    details.insert(
        "violations".into(),
        serde_json::to_value(violations).unwrap_or_default(),
    );
    details
}

/// Build the caller-facing error contract for `error`.
///
/// `contract` is the resolved contract, if resolution got that far.
pub fn error_contract_for(error: &InvocationError, contract: Option<&SkillContract>) -> ErrorContract {
    let message = error.to_string();

    match error {
        InvocationError::SkillNotFound { .. } => {
            ErrorContract::new(ErrorCode::SkillNotFound, message, contract, false, None)
        }
        InvocationError::InputValidation { violations, .. } => ErrorContract::new(
            ErrorCode::InputValidationError,
            message,
            contract,
            false,
            Some(violation_details(violations)),
        ),
        InvocationError::NotImplemented { .. } => {
            ErrorContract::new(ErrorCode::SkillNotImplemented, message, contract, false, None)
        }
        InvocationError::HandlerExecution { source, .. } => {
            let declared = source
                .code
                .as_deref()
                .and_then(|code| contract.and_then(|c| c.failure_mode(code)));

            match declared {
                Some(mode) => ErrorContract::new(
                    mode.code.clone(),
                    source.message.clone(),
                    contract,
                    mode.retryable,
                    source.details.clone(),
                ),
                None => {
                    let mut details = source.details.clone().unwrap_or_default();
                    if let Some(ref code) = source.code {
                        details.insert("handler_code".into(), Value::String(code.clone()));
                    }
                    ErrorContract::new(
                        ErrorCode::InternalError,
                        message,
                        contract,
                        false,
                        (!details.is_empty()).then_some(details),
                    )
                }
            }
        }
        InvocationError::HandlerTimeout { timeout_ms, .. } => {
            let retryable = contract
                .and_then(|c| c.failure_mode(ErrorCode::HandlerTimeout.as_str()))
                .map(|mode| mode.retryable)
                .unwrap_or(true);
            let mut details = Payload::new();
            details.insert("timeout_ms".into(), Value::from(*timeout_ms));
            ErrorContract::new(
                ErrorCode::HandlerTimeout,
                message,
                contract,
                retryable,
                Some(details),
            )
        }
        InvocationError::OutputValidation { violations, .. } => ErrorContract::new(
            ErrorCode::OutputValidationError,
            message,
            contract,
            false,
            Some(violation_details(violations)),
        ),
    }
}
