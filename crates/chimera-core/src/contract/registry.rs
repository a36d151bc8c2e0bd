//! Read-only contract registry.
//!
//! Initialization is eager and all-or-nothing: every document is validated,
//! and the first malformed document or duplicate id aborts the whole load.
//! After that the registry never changes, so it is shared behind an `Arc`
//! without any locking.

use std::collections::BTreeMap;
use std::sync::Arc;

use chimera_types::contract::SkillContract;
use chimera_types::error::{ContractError, ContractLoadError};
use serde_json::Value;

use super::shape::parse_contract;

/// A raw contract document plus a label for where it came from.
#[derive(Debug, Clone)]
pub struct ContractDocument {
    /// File path or other identifier, used in error messages.
    pub origin: String,
    pub document: Value,
}

impl ContractDocument {
    pub fn new(origin: impl Into<String>, document: Value) -> Self {
        Self {
            origin: origin.into(),
            document,
        }
    }
}

/// Validated skill contracts, indexed by id.
#[derive(Debug, Default)]
pub struct ContractRegistry {
    contracts: BTreeMap<String, Arc<SkillContract>>,
}

impl ContractRegistry {
    /// Validate and cache every document.
    ///
    /// # Errors
    ///
    /// Returns the first [`ContractLoadError`] encountered; no partial
    /// registry is ever produced.
    pub fn load<I>(documents: I) -> Result<Self, ContractLoadError>
    where
        I: IntoIterator<Item = ContractDocument>,
    {
        let mut contracts = BTreeMap::new();

        for ContractDocument { origin, document } in documents {
            let contract = parse_contract(&origin, &document)?;

            if contracts.contains_key(&contract.id) {
                return Err(ContractLoadError::DuplicateId {
                    origin,
                    contract_id: contract.id,
                });
            }

            tracing::debug!(
                contract_id = %contract.id,
                version = %contract.version,
                spec_version = %contract.spec_version,
                origin = %origin,
                "Loaded skill contract"
            );
            contracts.insert(contract.id.clone(), Arc::new(contract));
        }

        tracing::info!(count = contracts.len(), "Contract registry initialized");
        Ok(Self { contracts })
    }

    /// Look up a contract by skill id.
    pub fn get_contract(&self, skill_id: &str) -> Result<Arc<SkillContract>, ContractError> {
        self.contracts
            .get(skill_id)
            .cloned()
            .ok_or_else(|| ContractError::NotFound {
                skill_id: skill_id.to_owned(),
            })
    }

    /// Re-serialize a loaded contract into a JSON document.
    ///
    /// Every field of the source document, known or not, is reproduced.
    pub fn contract_document(&self, skill_id: &str) -> Result<Value, ContractError> {
        let contract = self.get_contract(skill_id)?;
        serde_json::to_value(contract.as_ref()).map_err(|e| ContractError::Serialization {
            skill_id: skill_id.to_owned(),
            message: e.to_string(),
        })
    }

    pub fn contains(&self, skill_id: &str) -> bool {
        self.contracts.contains_key(skill_id)
    }

    /// All contract ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        self.contracts.keys().map(|s| s.as_str()).collect()
    }

    /// All contracts, sorted by id.
    pub fn contracts(&self) -> impl Iterator<Item = &Arc<SkillContract>> {
        self.contracts.values()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(id: &str) -> Value {
        json!({
            "$comment": "authored by the content team",
            "id": id,
            "name": "Write post",
            "description": "Draft a social post",
            "input_schema": {
                "type": "object",
                "properties": {
                    "topic": {"type": "string", "description": "What to write about"},
                    "platform": {"type": "string"}
                },
                "required": ["topic", "platform"]
            },
            "output_schema": {
                "type": "object",
                "properties": {
                    "spec_version": {"type": "string"},
                    "contract_version": {"type": "string"},
                    "items": {"type": "array", "items": {"type": "object", "properties": {"text": {"type": "string"}}, "required": ["text"]}}
                },
                "required": ["spec_version", "contract_version", "items"]
            },
            "failure_modes": [
                {"code": "UNSUPPORTED_PLATFORM", "description": "platform not supported", "retryable": false}
            ],
            "version": "1.0.0",
            "spec_version": "1.0.0",
            "created_at": "2026-01-10T09:30:00Z"
        })
    }

    #[test]
    fn load_and_get_contract() {
        let registry =
            ContractRegistry::load(vec![ContractDocument::new("a.json", document("skill_a_v1"))])
                .unwrap();
        let contract = registry.get_contract("skill_a_v1").unwrap();
        assert_eq!(contract.name, "Write post");
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("skill_a_v1"));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let registry = ContractRegistry::load(Vec::new()).unwrap();
        assert!(registry.is_empty());
        match registry.get_contract("unknown_skill_id") {
            Err(ContractError::NotFound { skill_id }) => assert_eq!(skill_id, "unknown_skill_id"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_ids_fail_the_whole_load() {
        let result = ContractRegistry::load(vec![
            ContractDocument::new("a.json", document("skill_a_v1")),
            ContractDocument::new("b.json", document("skill_a_v1")),
        ]);
        match result {
            Err(ContractLoadError::DuplicateId {
                origin,
                contract_id,
            }) => {
                assert_eq!(origin, "b.json");
                assert_eq!(contract_id, "skill_a_v1");
            }
            other => panic!("expected DuplicateId, got {other:?}"),
        }
    }

    #[test]
    fn one_malformed_document_fails_the_whole_load() {
        let mut broken = document("skill_b_v1");
        broken.as_object_mut().unwrap().remove("failure_modes");
        let result = ContractRegistry::load(vec![
            ContractDocument::new("a.json", document("skill_a_v1")),
            ContractDocument::new("b.json", broken),
        ]);
        assert!(matches!(result, Err(ContractLoadError::Malformed { .. })));
    }

    #[test]
    fn contract_document_round_trips_every_field() {
        let original = document("skill_a_v1");
        let registry =
            ContractRegistry::load(vec![ContractDocument::new("a.json", original.clone())])
                .unwrap();
        assert_eq!(registry.contract_document("skill_a_v1").unwrap(), original);
    }

    #[test]
    fn ids_are_sorted() {
        let registry = ContractRegistry::load(vec![
            ContractDocument::new("z.json", document("skill_z_v1")),
            ContractDocument::new("a.json", document("skill_a_v1")),
        ])
        .unwrap();
        assert_eq!(registry.ids(), vec!["skill_a_v1", "skill_z_v1"]);
        let ids: Vec<_> = registry.contracts().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["skill_a_v1", "skill_z_v1"]);
    }

    #[test]
    fn every_loaded_contract_requires_stamp_fields() {
        let registry =
            ContractRegistry::load(vec![ContractDocument::new("a.json", document("skill_a_v1"))])
                .unwrap();
        for contract in registry.contracts() {
            assert!(contract.output_schema.requires("spec_version"));
            assert!(contract.output_schema.requires("contract_version"));
            assert!(!contract.failure_modes.is_empty());
        }
    }
}
