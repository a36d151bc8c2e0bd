//! Application error type mapping to HTTP status codes.
//!
//! Every error body is an error contract payload, so REST callers see the
//! same shape as in-process callers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use chimera_types::error_contract::{ErrorCode, ErrorContract};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// A failed or rejected invocation.
    Invocation(ErrorContract),
    /// Generic internal error outside an invocation.
    Internal(String),
}

impl From<ErrorContract> for AppError {
    fn from(e: ErrorContract) -> Self {
        AppError::Invocation(e)
    }
}

/// HTTP status for an error contract.
///
/// Codes outside the built-in taxonomy come from a skill's declared failure
/// modes and map to `502 Bad Gateway`.
pub fn status_for(error: &ErrorContract) -> StatusCode {
    const NOT_FOUND: &str = ErrorCode::SkillNotFound.as_str();
    const INPUT: &str = ErrorCode::InputValidationError.as_str();
    const NOT_IMPLEMENTED: &str = ErrorCode::SkillNotImplemented.as_str();
    const TIMEOUT: &str = ErrorCode::HandlerTimeout.as_str();
    const INTERNAL: &str = ErrorCode::InternalError.as_str();
    const OUTPUT: &str = ErrorCode::OutputValidationError.as_str();

    match error.error_code.as_str() {
        NOT_FOUND => StatusCode::NOT_FOUND,
        INPUT => StatusCode::UNPROCESSABLE_ENTITY,
        NOT_IMPLEMENTED => StatusCode::NOT_IMPLEMENTED,
        TIMEOUT => StatusCode::GATEWAY_TIMEOUT,
        INTERNAL | OUTPUT => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let contract = match self {
            AppError::Invocation(contract) => contract,
            AppError::Internal(message) => {
                ErrorContract::new(ErrorCode::InternalError, message, None, false, None)
            }
        };

        (status_for(&contract), Json(contract.to_payload())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(code: &str) -> ErrorContract {
        ErrorContract::new(code, "msg", None, false, None)
    }

    #[test]
    fn builtin_codes_map_to_fixed_statuses() {
        assert_eq!(status_for(&contract("SKILL_NOT_FOUND")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&contract("INPUT_VALIDATION_ERROR")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&contract("SKILL_NOT_IMPLEMENTED")),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(status_for(&contract("HANDLER_TIMEOUT")), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            status_for(&contract("OUTPUT_VALIDATION_ERROR")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn declared_failure_codes_are_bad_gateway() {
        assert_eq!(status_for(&contract("RATE_LIMITED")), StatusCode::BAD_GATEWAY);
    }
}
