//! Filesystem-based contract storage.
//!
//! Contracts live under a skills directory, one directory per skill:
//!
//! ```text
//! {skills_dir}/{skill_id}/
//!   contract.json
//! ```

use std::path::{Path, PathBuf};

use chimera_core::contract::{ContractDocument, ContractRegistry};
use chimera_types::error::ContractLoadError;

/// File name of a contract document inside a skill directory.
pub const CONTRACT_FILE: &str = "contract.json";

/// Reads contract documents from a skills directory.
#[derive(Debug, Clone)]
pub struct ContractStore {
    skills_dir: PathBuf,
}

impl ContractStore {
    pub fn new(skills_dir: impl Into<PathBuf>) -> Self {
        Self {
            skills_dir: skills_dir.into(),
        }
    }

    pub fn skills_dir(&self) -> &Path {
        &self.skills_dir
    }

    /// Path of the contract document for a skill directory name.
    pub fn contract_path(&self, name: &str) -> PathBuf {
        self.skills_dir.join(name).join(CONTRACT_FILE)
    }

    /// Every `*/contract.json` under the skills directory, sorted by path.
    ///
    /// Subdirectories without a contract document are skipped.
    pub fn discover(&self) -> Result<Vec<PathBuf>, ContractLoadError> {
        let entries = std::fs::read_dir(&self.skills_dir).map_err(|e| ContractLoadError::Io {
            origin: self.skills_dir.display().to_string(),
            message: e.to_string(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ContractLoadError::Io {
                origin: self.skills_dir.display().to_string(),
                message: e.to_string(),
            })?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }

            let contract_path = dir.join(CONTRACT_FILE);
            if contract_path.is_file() {
                paths.push(contract_path);
            } else {
                tracing::debug!(dir = %dir.display(), "Skipping directory without contract.json");
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Read and JSON-parse every discovered contract document.
    pub fn read_documents(&self) -> Result<Vec<ContractDocument>, ContractLoadError> {
        self.discover()?
            .into_iter()
            .map(|path| read_document(&path))
            .collect()
    }

    /// Build a registry from every contract in the skills directory.
    ///
    /// Fails on the first unreadable, unparsable or invalid document.
    pub fn load_registry(&self) -> Result<ContractRegistry, ContractLoadError> {
        let documents = self.read_documents()?;
        if documents.is_empty() {
            tracing::warn!(
                skills_dir = %self.skills_dir.display(),
                "No contract documents found; registry will be empty"
            );
        }
        ContractRegistry::load(documents)
    }
}

/// Read one contract document from disk.
pub fn read_document(path: &Path) -> Result<ContractDocument, ContractLoadError> {
    let origin = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| ContractLoadError::Io {
        origin: origin.clone(),
        message: e.to_string(),
    })?;
    let document = serde_json::from_str(&content).map_err(|e| ContractLoadError::Parse {
        origin: origin.clone(),
        message: e.to_string(),
    })?;
    Ok(ContractDocument::new(origin, document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn contract_json(id: &str) -> String {
        json!({
            "id": id,
            "name": id,
            "description": "test skill",
            "input_schema": {"properties": {}, "required": []},
            "output_schema": {
                "properties": {"spec_version": {"type": "string"}, "contract_version": {"type": "string"}},
                "required": ["spec_version", "contract_version"]
            },
            "failure_modes": [{"code": "UPSTREAM_DOWN", "description": "upstream", "retryable": true}],
            "version": "1.0.0",
            "spec_version": "1.0.0",
            "created_at": "2026-03-01T00:00:00Z"
        })
        .to_string()
    }

    fn write_skill(root: &Path, dir: &str, body: &str) {
        let skill_dir = root.join(dir);
        std::fs::create_dir_all(&skill_dir).unwrap();
        std::fs::write(skill_dir.join(CONTRACT_FILE), body).unwrap();
    }

    #[test]
    fn discovers_contracts_in_sorted_order() {
        let tmp = TempDir::new().unwrap();
        write_skill(tmp.path(), "skill_b_v1", &contract_json("skill_b_v1"));
        write_skill(tmp.path(), "skill_a_v1", &contract_json("skill_a_v1"));
        std::fs::create_dir_all(tmp.path().join("notes")).unwrap();
        std::fs::write(tmp.path().join("README.md"), "not a skill").unwrap();

        let store = ContractStore::new(tmp.path());
        let paths = store.discover().unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("skill_a_v1/contract.json"));
        assert!(paths[1].ends_with("skill_b_v1/contract.json"));
    }

    #[test]
    fn load_registry_indexes_by_contract_id() {
        let tmp = TempDir::new().unwrap();
        write_skill(tmp.path(), "skill_a_v1", &contract_json("skill_a_v1"));
        write_skill(tmp.path(), "skill_b_v1", &contract_json("skill_b_v1"));

        let registry = ContractStore::new(tmp.path()).load_registry().unwrap();
        assert_eq!(registry.ids(), vec!["skill_a_v1", "skill_b_v1"]);
    }

    #[test]
    fn missing_directory_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let store = ContractStore::new(tmp.path().join("nope"));
        assert!(matches!(
            store.load_registry(),
            Err(ContractLoadError::Io { .. })
        ));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        write_skill(tmp.path(), "skill_a_v1", "{ not json");
        match ContractStore::new(tmp.path()).load_registry() {
            Err(ContractLoadError::Parse { origin, .. }) => {
                assert!(origin.ends_with("contract.json"));
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn one_bad_contract_fails_the_whole_load() {
        let tmp = TempDir::new().unwrap();
        write_skill(tmp.path(), "skill_a_v1", &contract_json("skill_a_v1"));
        write_skill(tmp.path(), "skill_b_v1", r#"{"id": "skill_b_v1"}"#);
        assert!(matches!(
            ContractStore::new(tmp.path()).load_registry(),
            Err(ContractLoadError::Malformed { .. })
        ));
    }

    #[test]
    fn duplicate_ids_across_directories_fail() {
        let tmp = TempDir::new().unwrap();
        write_skill(tmp.path(), "a", &contract_json("skill_same_v1"));
        write_skill(tmp.path(), "b", &contract_json("skill_same_v1"));
        assert!(matches!(
            ContractStore::new(tmp.path()).load_registry(),
            Err(ContractLoadError::DuplicateId { .. })
        ));
    }

    #[test]
    fn empty_directory_yields_empty_registry() {
        let tmp = TempDir::new().unwrap();
        let registry = ContractStore::new(tmp.path()).load_registry().unwrap();
        assert!(registry.is_empty());
    }
}
