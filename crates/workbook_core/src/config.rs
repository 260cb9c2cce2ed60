//! Core configuration.
//!
//! # Responsibility
//! - Deserialize deployment settings: feature flags, storage limits, logging.
//! - Reject settings that would make storage calls unbounded.
//!
//! # Invariants
//! - Every field has a default; an empty JSON object is a valid config.
//! - Timeouts are strictly positive.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

const DEFAULT_QUERY_TIMEOUT_MS: u64 = 20_000;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Deployment-wide feature flags copied into every request context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureFlags {
    /// Access-control service is reachable in this deployment.
    pub access_service_enabled: bool,
    /// Entities must be registered with the access bindings service.
    pub access_bindings_service_enabled: bool,
}

/// Storage limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageConfig {
    /// Deadline for a single statement, in milliseconds.
    pub query_timeout_ms: u64,
    /// Bounded wait for the SQLite writer lock, in milliseconds.
    pub busy_timeout_ms: u64,
    /// Route reads to a read-only replica connection when the store is a file.
    pub use_replica: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            use_replica: true,
        }
    }
}

impl StorageConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Logging settings consumed by [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute log directory. `None` leaves logging uninitialized.
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

/// Top-level core configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoreConfig {
    pub features: FeatureFlags,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl CoreConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(value: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(value).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ConfigError::Io(format!("failed to read `{}`: {err}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.query_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "storage.queryTimeoutMs must be greater than zero".to_string(),
            ));
        }
        if self.storage.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "storage.busyTimeoutMs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration load errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(message) => write!(f, "config io error: {message}"),
            Self::Parse(message) => write!(f, "config parse error: {message}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use std::time::Duration;

    #[test]
    fn empty_object_yields_defaults() {
        let config = CoreConfig::from_json_str("{}").expect("empty config should parse");
        assert!(!config.features.access_service_enabled);
        assert!(!config.features.access_bindings_service_enabled);
        assert_eq!(config.storage.query_timeout(), Duration::from_secs(20));
        assert_eq!(config.storage.busy_timeout(), Duration::from_secs(5));
        assert!(config.storage.use_replica);
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn parses_camel_case_feature_flags() {
        let config = CoreConfig::from_json_str(
            r#"{
                "features": {"accessServiceEnabled": true, "accessBindingsServiceEnabled": true},
                "storage": {"queryTimeoutMs": 250}
            }"#,
        )
        .expect("config should parse");
        assert!(config.features.access_service_enabled);
        assert!(config.features.access_bindings_service_enabled);
        assert_eq!(config.storage.query_timeout_ms, 250);
        assert_eq!(config.storage.busy_timeout_ms, 5_000);
    }

    #[test]
    fn rejects_zero_timeouts() {
        let err = CoreConfig::from_json_str(r#"{"storage": {"queryTimeoutMs": 0}}"#)
            .expect_err("zero query timeout must fail");
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("queryTimeoutMs")));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = CoreConfig::from_json_str("{features:").expect_err("malformed json must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
