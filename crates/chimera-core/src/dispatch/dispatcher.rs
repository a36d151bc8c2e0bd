//! The invocation dispatcher.
//!
//! Runs one skill call through resolve -> validate input -> dispatch ->
//! execute -> validate output -> stamp, and converts a failure at any stage
//! into an [`ErrorContract`]. No partial output is ever returned alongside an
//! error, and failed handler calls are never retried here: `retryable` is a
//! signal for the caller.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chimera_types::Payload;
use chimera_types::config::RuntimeConfig;
use chimera_types::contract::{
    CONTRACT_VERSION_FIELD, SPEC_VERSION_FIELD, STAMPED_OUTPUT_FIELDS, SkillContract,
};
use chimera_types::error::{HandlerError, InvocationError};
use chimera_types::error_contract::ErrorContract;
use chimera_types::invocation::{InvocationRecord, InvocationState};
use chimera_types::validation::Violation;
use futures_util::FutureExt;
use serde_json::Value;
use tracing::Instrument;

use super::invocation::Invocation;
use crate::contract::ContractRegistry;
use crate::handler::{BoxSkillHandler, HandlerRegistry};
use crate::schema::{validate, validate_excluding};

/// Stateless entry point for skill invocations.
///
/// Cheap to clone; clones share the same read-only registries, and
/// concurrent `invoke` calls never block each other.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    contracts: Arc<ContractRegistry>,
    handlers: Arc<HandlerRegistry>,
    config: Arc<RuntimeConfig>,
}

impl Dispatcher {
    /// Create a dispatcher with the default runtime configuration.
    pub fn new(contracts: Arc<ContractRegistry>, handlers: Arc<HandlerRegistry>) -> Self {
        Self::with_config(contracts, handlers, RuntimeConfig::default())
    }

    pub fn with_config(
        contracts: Arc<ContractRegistry>,
        handlers: Arc<HandlerRegistry>,
        config: RuntimeConfig,
    ) -> Self {
        for contract in contracts.contracts() {
            if !handlers.contains(&contract.id) {
                tracing::warn!(
                    skill_id = %contract.id,
                    "Contract has no registered handler; invocations will fail with SKILL_NOT_IMPLEMENTED"
                );
            }
        }

        Self {
            contracts,
            handlers,
            config: Arc::new(config),
        }
    }

    pub fn contracts(&self) -> &ContractRegistry {
        &self.contracts
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Invoke a skill.
    ///
    /// Returns the validated output stamped with the contract's
    /// `spec_version` and `contract_version`, or the error contract
    /// describing the first stage that failed.
    pub async fn invoke(&self, skill_id: &str, input: &Payload) -> Result<Payload, ErrorContract> {
        self.invoke_with_record(skill_id, input).await.0
    }

    /// Like [`invoke`](Self::invoke), also returning the invocation summary.
    pub async fn invoke_with_record(
        &self,
        skill_id: &str,
        input: &Payload,
    ) -> (Result<Payload, ErrorContract>, InvocationRecord) {
        let mut invocation = Invocation::new(skill_id, input);
        let span = tracing::info_span!(
            "invoke",
            skill_id = %skill_id,
            invocation_id = %invocation.id(),
        );

        async move {
            let (result, record) = match self.run(&mut invocation).await {
                Ok(output) => invocation.complete(output),
                Err(error) => {
                    log_failure(&error);
                    invocation.fail(error)
                }
            };
            log_record(&record);
            (result, record)
        }
        .instrument(span)
        .await
    }

    /// Fail an invocation whose input could not be read as an object.
    ///
    /// Resolution still runs first, so an unknown skill reports
    /// `SKILL_NOT_FOUND`; otherwise `violation` becomes an
    /// `INPUT_VALIDATION_ERROR`. The handler is never called.
    pub fn reject_input(
        &self,
        skill_id: &str,
        violation: Violation,
    ) -> (Result<Payload, ErrorContract>, InvocationRecord) {
        let empty = Payload::new();
        let mut invocation = Invocation::new(skill_id, &empty);
        let span = tracing::info_span!(
            "invoke",
            skill_id = %skill_id,
            invocation_id = %invocation.id(),
        );
        let _entered = span.enter();

        let error = match self.contracts.get_contract(skill_id) {
            Ok(contract) => {
                invocation.resolve(contract);
                InvocationError::InputValidation {
                    skill_id: skill_id.to_owned(),
                    violations: vec![violation],
                }
            }
            Err(_) => InvocationError::SkillNotFound {
                skill_id: skill_id.to_owned(),
            },
        };
        log_failure(&error);
        let (result, record) = invocation.fail(error);
        log_record(&record);
        (result, record)
    }

    async fn run(&self, invocation: &mut Invocation<'_>) -> Result<Payload, InvocationError> {
        let skill_id = invocation.skill_id();

        let contract = self
            .contracts
            .get_contract(skill_id)
            .map_err(|_| InvocationError::SkillNotFound {
                skill_id: skill_id.to_owned(),
            })?;
        invocation.resolve(Arc::clone(&contract));

        let input_check = validate(invocation.input(), &contract.input_schema);
        if !input_check.is_valid() {
            return Err(InvocationError::InputValidation {
                skill_id: skill_id.to_owned(),
                violations: input_check.into_violations(),
            });
        }
        invocation.advance(InvocationState::InputValidated);

        let handler = self
            .handlers
            .get(skill_id)
            .ok_or_else(|| InvocationError::NotImplemented {
                skill_id: skill_id.to_owned(),
            })?;

        let raw = self.execute(skill_id, handler, invocation.input()).await?;
        invocation.advance(InvocationState::Executed);

        let output_check = validate_excluding(&raw, &contract.output_schema, &STAMPED_OUTPUT_FIELDS);
        if !output_check.is_valid() {
            return Err(InvocationError::OutputValidation {
                skill_id: skill_id.to_owned(),
                violations: output_check.into_violations(),
            });
        }
        invocation.advance(InvocationState::OutputValidated);

        Ok(stamp(raw, &contract))
    }

    /// Run the handler under the configured timeout, catching panics.
    ///
    /// On timeout the handler future is dropped, which cancels it.
    async fn execute(
        &self,
        skill_id: &str,
        handler: &BoxSkillHandler,
        input: &Payload,
    ) -> Result<Payload, InvocationError> {
        let call = AssertUnwindSafe(handler.handle(input)).catch_unwind();

        let outcome = match self.config.timeout_for(skill_id) {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                InvocationError::HandlerTimeout {
                    skill_id: skill_id.to_owned(),
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                }
            })?,
            None => call.await,
        };

        match outcome {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(source)) => Err(InvocationError::HandlerExecution {
                skill_id: skill_id.to_owned(),
                source,
            }),
            Err(panic) => Err(InvocationError::HandlerExecution {
                skill_id: skill_id.to_owned(),
                source: HandlerError::new(format!("handler panicked: {}", panic_message(&*panic))),
            }),
        }
    }
}

/// Overwrite the version fields with the contract's own values.
pub fn stamp(mut output: Payload, contract: &SkillContract) -> Payload {
    output.insert(
        SPEC_VERSION_FIELD.to_owned(),
        Value::String(contract.spec_version.clone()),
    );
    output.insert(
        CONTRACT_VERSION_FIELD.to_owned(),
        Value::String(contract.version.clone()),
    );
    output
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

fn log_record(record: &InvocationRecord) {
    tracing::debug!(
        state = %record.state,
        last_stage = %record.last_stage,
        error_code = record.error_code.as_deref().unwrap_or(""),
        duration_ms = record.duration_ms,
        "Invocation finished"
    );
}

fn log_failure(error: &InvocationError) {
    match error {
        InvocationError::SkillNotFound { .. } | InvocationError::InputValidation { .. } => {
            tracing::debug!(error = %error, "Invocation rejected");
        }
        InvocationError::HandlerExecution { source, .. } => {
            tracing::warn!(
                error = %error,
                handler_code = source.code.as_deref().unwrap_or(""),
                "Skill handler failed"
            );
        }
        _ => tracing::warn!(error = %error, "Invocation failed"),
    }
}
