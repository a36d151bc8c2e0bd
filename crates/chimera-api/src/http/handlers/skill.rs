//! Skill HTTP handlers for the REST API.
//!
//! Listing and inspection return the envelope format; invocation returns the
//! stamped skill output directly, or an error contract.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use chimera_types::Payload;
use chimera_types::contract::FieldKind;
use chimera_types::error_contract::{ErrorCode, ErrorContract};
use chimera_types::validation::{Violation, ViolationReason};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Response header carrying the invocation id.
pub const INVOCATION_ID_HEADER: HeaderName = HeaderName::from_static("x-invocation-id");

/// Response item for listing skills.
#[derive(Debug, Serialize)]
pub(crate) struct SkillListItem {
    id: String,
    name: String,
    description: String,
    version: String,
    spec_version: String,
    failure_codes: Vec<String>,
    implemented: bool,
}

/// GET /api/v1/skills - List every loaded contract.
pub async fn list_skills(State(state): State<AppState>) -> Json<ApiResponse<Vec<SkillListItem>>> {
    let start = std::time::Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let handlers = state.dispatcher.handlers();
    let items = state
        .dispatcher
        .contracts()
        .contracts()
        .map(|c| SkillListItem {
            id: c.id.clone(),
            name: c.name.clone(),
            description: c.description.clone(),
            version: c.version.clone(),
            spec_version: c.spec_version.clone(),
            failure_codes: c.failure_modes.iter().map(|m| m.code.clone()).collect(),
            implemented: handlers.contains(&c.id),
        })
        .collect();

    let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    Json(ApiResponse::success(items, request_id, elapsed).with_link("self", "/api/v1/skills"))
}

/// GET /api/v1/skills/{id} - The contract document for one skill.
pub async fn get_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = std::time::Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let contracts = state.dispatcher.contracts();
    if !contracts.contains(&id) {
        return Err(AppError::Invocation(ErrorContract::new(
            ErrorCode::SkillNotFound,
            format!("skill '{id}' is not registered"),
            None,
            false,
            None,
        )));
    }
    let document = contracts
        .contract_document(&id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok(Json(
        ApiResponse::success(document, request_id, elapsed)
            .with_link("self", &format!("/api/v1/skills/{id}"))
            .with_link("invoke", &format!("/api/v1/skills/{id}/invoke")),
    ))
}

/// POST /api/v1/skills/{id}/invoke - Run one invocation.
///
/// The request body is the skill's input object. An empty body is treated
/// as `{}`.
pub async fn invoke_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let (result, record) = match parse_input(&body) {
        Ok(input) => state.dispatcher.invoke_with_record(&id, &input).await,
        Err(violation) => state.dispatcher.reject_input(&id, violation),
    };
    let invocation_id = HeaderValue::from_str(&record.invocation_id.to_string())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut response = match result {
        Ok(output) => Json(Value::Object(output)).into_response(),
        Err(error) => AppError::Invocation(error).into_response(),
    };
    response
        .headers_mut()
        .insert(INVOCATION_ID_HEADER, invocation_id);
    Ok(response)
}

fn parse_input(body: &[u8]) -> Result<Payload, Violation> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Violation::new(
            "",
            ViolationReason::WrongType,
            format!(
                "request body must be a JSON object, got {}",
                FieldKind::describe(&other)
            ),
        )),
        Err(e) => Err(Violation::new(
            "",
            ViolationReason::WrongType,
            format!("request body is not valid JSON: {e}"),
        )),
    }
}
