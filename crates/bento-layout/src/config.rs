//! Store configuration.
//!
//! [`StoreConfig`] collects the few knobs a layout store has. It can be built
//! in code or loaded from JSON, or from TOML with the `config-toml` feature.
//! Missing fields take their defaults.
//!
//! ```toml
//! # bentostream.toml
//! key_prefix = "bentostream-layout"
//! persistence_enabled = true
//! history_capacity = 50
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::DEFAULT_KEY_PREFIX;
use crate::history::{DEFAULT_HISTORY_CAPACITY, HISTORY_KEY};

/// Layout store and history settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Namespace for layout keys (`"<prefix>-<count>"`).
    pub key_prefix: String,
    /// When false, the store never reads or writes layouts.
    pub persistence_enabled: bool,
    /// Storage key of the recent-items history.
    pub history_key: String,
    /// Most recent items kept in history.
    pub history_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_owned(),
            persistence_enabled: true,
            history_key: HISTORY_KEY.to_owned(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config-toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-toml")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all settings.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.key_prefix.trim().is_empty() {
            errors.push("key_prefix must not be empty".into());
        }
        if self.key_prefix.contains(['/', '\\']) {
            errors.push(format!(
                "key_prefix must not contain path separators, got {:?}",
                self.key_prefix
            ));
        }
        if self.history_key.trim().is_empty() {
            errors.push("history_key must not be empty".into());
        }
        if self.history_capacity == 0 {
            errors.push("history_capacity must be > 0".into());
        }

        errors
    }

    /// `self` if [`StoreConfig::validate`] finds nothing, else the problems.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a store configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "config-toml")]
    #[error("TOML parse error: {0}")]
    Toml(toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = StoreConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.key_prefix, "bentostream-layout");
        assert_eq!(config.history_key, "bentostream_saved_streams");
        assert_eq!(config.history_capacity, 50);
        assert!(config.persistence_enabled);
    }

    #[test]
    fn json_partial_fills_defaults() {
        let config = StoreConfig::from_json_str(r#"{"key_prefix":"wall"}"#).unwrap();
        assert_eq!(config.key_prefix, "wall");
        assert!(config.persistence_enabled);
        assert_eq!(config.history_capacity, 50);
    }

    #[test]
    fn json_rejects_garbage() {
        assert!(matches!(
            StoreConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn validate_reports_each_problem() {
        let config = StoreConfig {
            key_prefix: "a/b".into(),
            persistence_enabled: true,
            history_key: " ".into(),
            history_capacity: 0,
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("path separators")));
        assert!(errors.iter().any(|e| e.contains("history_capacity")));

        let err = config.validated().unwrap_err();
        assert!(err.to_string().starts_with("validation errors:"));
    }

    #[test]
    fn empty_prefix_invalid() {
        let config = StoreConfig {
            key_prefix: String::new(),
            ..StoreConfig::default()
        };
        assert_eq!(config.validate(), vec!["key_prefix must not be empty".to_owned()]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = StoreConfig::from_json_file("/nonexistent/bentostream.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[cfg(feature = "config-toml")]
    #[test]
    fn toml_round_trip() {
        let config = StoreConfig::from_toml_str(
            "key_prefix = \"wall\"\npersistence_enabled = false\nhistory_capacity = 10\n",
        )
        .unwrap();
        assert_eq!(config.key_prefix, "wall");
        assert!(!config.persistence_enabled);
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.history_key, "bentostream_saved_streams");
    }
}
