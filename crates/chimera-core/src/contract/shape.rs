//! The contract-of-contracts: what a contract document must look like.
//!
//! Structural checks (required keys, kinds) run through the shared schema
//! validator against [`contract_document_schema`]. Semantic checks that a
//! schema cannot express (non-empty and unique failure codes, stamp fields
//! in the output schema, version syntax, timestamps) follow in
//! [`check_contract`].

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use chimera_types::contract::{
    FieldKind, FieldSchema, ObjectSchema, STAMPED_OUTPUT_FIELDS, SkillContract,
};
use chimera_types::error::ContractLoadError;
use chimera_types::error_contract::RUNTIME_SPEC_VERSION;
use chimera_types::validation::{Violation, ViolationReason};
use serde_json::Value;

use crate::schema::validate;

/// Top-level keys every contract document must carry.
pub const REQUIRED_CONTRACT_KEYS: [&str; 9] = [
    "id",
    "name",
    "description",
    "input_schema",
    "output_schema",
    "failure_modes",
    "version",
    "spec_version",
    "created_at",
];

static CONTRACT_SCHEMA: LazyLock<ObjectSchema> = LazyLock::new(build_contract_schema);

/// The schema every contract document is validated against before parsing.
pub fn contract_document_schema() -> &'static ObjectSchema {
    &CONTRACT_SCHEMA
}

fn field(kind: FieldKind) -> FieldSchema {
    FieldSchema::of(kind)
}

fn owned(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| (*k).to_owned()).collect()
}

fn build_contract_schema() -> ObjectSchema {
    let payload_schema = FieldSchema::object_with(
        BTreeMap::from([
            ("properties".to_owned(), field(FieldKind::Object)),
            (
                "required".to_owned(),
                FieldSchema::array_of(field(FieldKind::String)),
            ),
            ("additionalProperties".to_owned(), field(FieldKind::Boolean)),
        ]),
        owned(&["properties", "required"]),
    );

    let failure_mode = FieldSchema::object_with(
        BTreeMap::from([
            ("code".to_owned(), field(FieldKind::String)),
            ("description".to_owned(), field(FieldKind::String)),
            ("retryable".to_owned(), field(FieldKind::Boolean)),
        ]),
        owned(&["code", "description", "retryable"]),
    );

    let mut properties = BTreeMap::new();
    for key in ["id", "name", "description", "version", "spec_version", "created_at"] {
        properties.insert(key.to_owned(), field(FieldKind::String));
    }
    properties.insert("input_schema".to_owned(), payload_schema.clone());
    properties.insert("output_schema".to_owned(), payload_schema);
    properties.insert(
        "failure_modes".to_owned(),
        FieldSchema::array_of(failure_mode),
    );

    ObjectSchema::new(properties, owned(&REQUIRED_CONTRACT_KEYS))
}

/// Validate and parse one contract document.
///
/// `origin` names where the document came from (usually a file path) and is
/// only used in error messages.
pub fn parse_contract(origin: &str, document: &Value) -> Result<SkillContract, ContractLoadError> {
    let Value::Object(map) = document else {
        return Err(ContractLoadError::Malformed {
            origin: origin.to_owned(),
            violations: vec![Violation::new(
                "$",
                ViolationReason::WrongType,
                format!("expected object, got {}", FieldKind::describe(document)),
            )],
        });
    };

    let shape = validate(map, contract_document_schema());
    if !shape.is_valid() {
        return Err(ContractLoadError::Malformed {
            origin: origin.to_owned(),
            violations: shape.into_violations(),
        });
    }

    let contract_id = map
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();

    let contract: SkillContract =
        serde_json::from_value(document.clone()).map_err(|e| ContractLoadError::Invalid {
            origin: origin.to_owned(),
            contract_id: contract_id.clone(),
            reason: e.to_string(),
        })?;

    check_contract(&contract).map_err(|reason| ContractLoadError::Invalid {
        origin: origin.to_owned(),
        contract_id,
        reason,
    })?;

    Ok(contract)
}

/// Semantic checks on a structurally valid contract.
pub fn check_contract(contract: &SkillContract) -> Result<(), String> {
    if contract.id.trim().is_empty() {
        return Err("id must not be empty".to_owned());
    }

    if contract.failure_modes.is_empty() {
        return Err("failure_modes must not be empty".to_owned());
    }

    let mut seen = HashSet::new();
    for (i, mode) in contract.failure_modes.iter().enumerate() {
        if mode.code.trim().is_empty() {
            return Err(format!("failure_modes[{i}].code must not be empty"));
        }
        if mode.description.trim().is_empty() {
            return Err(format!("failure_modes[{i}].description must not be empty"));
        }
        if !seen.insert(mode.code.as_str()) {
            return Err(format!("failure mode code '{}' is declared twice", mode.code));
        }
    }

    for stamped in STAMPED_OUTPUT_FIELDS {
        if !contract.output_schema.requires(stamped) {
            return Err(format!("output_schema.required must include '{stamped}'"));
        }
    }

    contract
        .version
        .parse::<semver::Version>()
        .map_err(|e| format!("invalid semver version '{}': {e}", contract.version))?;

    let spec_version = contract
        .spec_version
        .parse::<semver::Version>()
        .map_err(|e| format!("invalid spec_version '{}': {e}", contract.spec_version))?;
    let runtime = runtime_spec_version();
    if spec_version.major != runtime.major {
        return Err(format!(
            "spec_version '{}' is not understood by this runtime (supports {}.x)",
            contract.spec_version, runtime.major
        ));
    }

    if contract.created_at_utc().is_none() {
        return Err(format!(
            "created_at '{}' is not an RFC 3339 timestamp",
            contract.created_at
        ));
    }

    Ok(())
}

fn runtime_spec_version() -> semver::Version {
    RUNTIME_SPEC_VERSION
        .parse()
        .unwrap_or_else(|_| semver::Version::new(1, 0, 0))
}
