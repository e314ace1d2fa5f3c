//! Runner configuration — file and environment merging.
//!
//! Sources, lowest to highest priority: built-in defaults, a project-level
//! `gangway.toml` (or `.gangway.toml`), an explicitly named config file,
//! and `GANGWAY_*` environment variables.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("entry_point cannot be empty")]
    EmptyEntryPoint,

    #[error("callback_timeout_ms cannot be 0")]
    InvalidTimeout,
}

/// Configuration for the gangway runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Entry point called when the caller does not name one.
    pub entry_point: String,
    /// Bound on a worker's wait for one host callback reply, in
    /// milliseconds. Absent means wait indefinitely.
    pub callback_timeout_ms: Option<u64>,
    /// Default log filter, overridden by `-v` flags.
    pub log_filter: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            entry_point: "main".to_string(),
            callback_timeout_ms: None,
            log_filter: "warn".to_string(),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from all sources with proper priority.
    pub fn load(config_path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        // Project-level config (check both names)
        for filename in ["gangway.toml", ".gangway.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                figment = figment.merge(Toml::file(path));
                break;
            }
        }

        // Explicit config path
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Environment overrides everything
        figment = figment.merge(Env::prefixed("GANGWAY_"));

        figment.extract().map_err(Box::new)
    }

    /// Check invariants the TOML/env merge cannot express.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.entry_point.is_empty() {
            return Err(ConfigValidationError::EmptyEntryPoint);
        }
        if self.callback_timeout_ms == Some(0) {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        Ok(())
    }

    /// The reply-wait bound as a `Duration`, if one is configured.
    pub fn callback_timeout(&self) -> Option<Duration> {
        self.callback_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.entry_point, "main");
        assert_eq!(config.callback_timeout_ms, None);
        assert_eq!(config.log_filter, "warn");
        assert!(config.callback_timeout().is_none());
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            entry_point = "handle"
            callback_timeout_ms = 250
        "#,
        )
        .unwrap();

        let config = RunnerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.entry_point, "handle");
        assert_eq!(config.callback_timeout(), Some(Duration::from_millis(250)));
        // Untouched keys keep their defaults.
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_missing_explicit_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent.toml");
        let config = RunnerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.entry_point, "main");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RunnerConfig::default();
        assert!(config.validate().is_ok());

        config.entry_point = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyEntryPoint)
        ));

        config.entry_point = "main".to_string();
        config.callback_timeout_ms = Some(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTimeout)
        ));
    }
}
