//! Runtime configuration loader for Chimera.
//!
//! Reads `config.toml` from the data directory (`~/.chimera/` in production)
//! and deserializes it into [`RuntimeConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::{Path, PathBuf};

use chimera_types::config::RuntimeConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CHIMERA_DATA_DIR";

/// Load runtime configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`RuntimeConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_runtime_config(data_dir: &Path) -> RuntimeConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return RuntimeConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return RuntimeConfig::default();
        }
    };

    match toml::from_str::<RuntimeConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            RuntimeConfig::default()
        }
    }
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `CHIMERA_DATA_DIR` environment variable
/// 2. `~/.chimera`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".chimera");
    }

    PathBuf::from(".chimera")
}

/// Directory holding contract documents.
///
/// A relative `skills_dir` in the config resolves against `data_dir`.
pub fn resolve_skills_dir(data_dir: &Path, config: &RuntimeConfig) -> PathBuf {
    match &config.skills_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => data_dir.join(dir),
        None => data_dir.join("skills"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_runtime_config(tmp.path()).await;
        assert_eq!(config.handler_timeout_ms, 30_000);
        assert!(config.skill_timeouts_ms.is_empty());
    }

    #[tokio::test]
    async fn valid_toml_is_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
skills_dir = "contracts"
handler_timeout_ms = 5000

[skill_timeouts_ms]
skill_trend_scan_v1 = 0
"#,
        )
        .await
        .unwrap();

        let config = load_runtime_config(tmp.path()).await;
        assert_eq!(config.handler_timeout_ms, 5_000);
        assert_eq!(config.skill_timeouts_ms["skill_trend_scan_v1"], 0);
        assert_eq!(
            resolve_skills_dir(tmp.path(), &config),
            tmp.path().join("contracts")
        );
    }

    #[tokio::test]
    async fn invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "handler_timeout_ms = [")
            .await
            .unwrap();

        let config = load_runtime_config(tmp.path()).await;
        assert_eq!(config.handler_timeout_ms, 30_000);
    }

    #[test]
    fn skills_dir_defaults_under_data_dir() {
        let data_dir = PathBuf::from("/home/user/.chimera");
        assert_eq!(
            resolve_skills_dir(&data_dir, &RuntimeConfig::default()),
            PathBuf::from("/home/user/.chimera/skills")
        );

        let config = RuntimeConfig {
            skills_dir: Some(PathBuf::from("/srv/skills")),
            ..RuntimeConfig::default()
        };
        assert_eq!(resolve_skills_dir(&data_dir, &config), PathBuf::from("/srv/skills"));
    }

    #[test]
    fn resolve_data_dir_from_env() {
        // SAFETY: This test is single-threaded and restores the env var immediately.
        unsafe {
            std::env::set_var(DATA_DIR_ENV, "/tmp/test-chimera");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-chimera"));
        unsafe {
            std::env::remove_var(DATA_DIR_ENV);
        }
    }
}
