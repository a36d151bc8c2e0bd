//! Application state wiring the runtime together.
//!
//! AppState holds the dispatcher used by both CLI commands and REST handlers.
//! The dispatcher in turn owns the read-only contract and handler registries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chimera_core::dispatch::Dispatcher;
use chimera_infra::config::{load_runtime_config, resolve_data_dir, resolve_skills_dir};
use chimera_infra::contract_store::ContractStore;
use chimera_infra::skills::builtin_handlers;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub skills_dir: PathBuf,
}

/// Where contracts and configuration are read from.
#[derive(Debug, Clone)]
pub struct Locations {
    pub data_dir: PathBuf,
    pub skills_dir: PathBuf,
}

impl Locations {
    /// Resolve directories from CLI overrides, environment and `config.toml`.
    pub async fn resolve(
        data_dir: Option<PathBuf>,
        skills_dir: Option<PathBuf>,
    ) -> (Self, chimera_types::config::RuntimeConfig) {
        let data_dir = data_dir.unwrap_or_else(resolve_data_dir);
        let config = load_runtime_config(&data_dir).await;
        let skills_dir = skills_dir.unwrap_or_else(|| resolve_skills_dir(&data_dir, &config));
        (
            Self {
                data_dir,
                skills_dir,
            },
            config,
        )
    }
}

impl AppState {
    /// Load every contract, register the built-in handlers and build the
    /// dispatcher. Any contract load failure aborts startup.
    pub async fn init(data_dir: Option<PathBuf>, skills_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let (locations, config) = Locations::resolve(data_dir, skills_dir).await;

        let registry = ContractStore::new(&locations.skills_dir)
            .load_registry()
            .with_context(|| {
                format!(
                    "Failed to load skill contracts from {}",
                    locations.skills_dir.display()
                )
            })?;

        let dispatcher =
            Dispatcher::with_config(Arc::new(registry), Arc::new(builtin_handlers()), config);

        tracing::info!(
            data_dir = %locations.data_dir.display(),
            skills_dir = %locations.skills_dir.display(),
            contracts = dispatcher.contracts().len(),
            handlers = dispatcher.handlers().len(),
            "Skill runtime ready"
        );

        Ok(Self::from_dispatcher(dispatcher, &locations.skills_dir))
    }

    /// Build state around an existing dispatcher.
    pub fn from_dispatcher(dispatcher: Dispatcher, skills_dir: &Path) -> Self {
        Self {
            dispatcher,
            skills_dir: skills_dir.to_path_buf(),
        }
    }
}
