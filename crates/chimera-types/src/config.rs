//! Runtime configuration types.
//!
//! `RuntimeConfig` represents the `config.toml` in the Chimera data
//! directory. Every field has a default, so an empty file is valid.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration for the skill runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Directory holding `<skill_id>/contract.json` documents.
    ///
    /// Relative paths resolve against the data directory. `None` means
    /// `{data_dir}/skills`.
    #[serde(default)]
    pub skills_dir: Option<PathBuf>,

    /// Default handler timeout in milliseconds. `0` disables the timeout.
    #[serde(default = "default_handler_timeout_ms")]
    pub handler_timeout_ms: u64,

    /// Per-skill timeout overrides in milliseconds, keyed by skill id.
    #[serde(default)]
    pub skill_timeouts_ms: HashMap<String, u64>,
}

fn default_handler_timeout_ms() -> u64 {
    30_000
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            skills_dir: None,
            handler_timeout_ms: default_handler_timeout_ms(),
            skill_timeouts_ms: HashMap::new(),
        }
    }
}

impl RuntimeConfig {
    /// Effective handler timeout for a skill, or `None` when disabled.
    pub fn timeout_for(&self, skill_id: &str) -> Option<Duration> {
        let ms = self
            .skill_timeouts_ms
            .get(skill_id)
            .copied()
            .unwrap_or(self.handler_timeout_ms);
        (ms > 0).then(|| Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_config_default_values() {
        let config = RuntimeConfig::default();
        assert_eq!(config.handler_timeout_ms, 30_000);
        assert!(config.skills_dir.is_none());
        assert!(config.skill_timeouts_ms.is_empty());
    }

    #[test]
    fn test_runtime_config_deserialize_with_defaults() {
        let config: RuntimeConfig = toml::from_str("").unwrap();
        assert_eq!(config.handler_timeout_ms, 30_000);
    }

    #[test]
    fn test_runtime_config_deserialize_with_values() {
        let toml_str = r#"
skills_dir = "/opt/chimera/skills"
handler_timeout_ms = 5000

[skill_timeouts_ms]
skill_trend_scan_v1 = 12000
skill_write_post_v1 = 0
"#;
        let config: RuntimeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.skills_dir, Some(PathBuf::from("/opt/chimera/skills")));
        assert_eq!(
            config.timeout_for("skill_trend_scan_v1"),
            Some(Duration::from_millis(12_000))
        );
        assert_eq!(config.timeout_for("skill_write_post_v1"), None);
        assert_eq!(
            config.timeout_for("skill_other_v1"),
            Some(Duration::from_millis(5_000))
        );
    }
}
