//! Configuration file management.
//!
//! Settings are read from `<config dir>/tmi-stats/config.toml`. Every section
//! and field is optional; anything missing falls back to the defaults below.
//!
//! ```toml
//! [gateway]
//! host = "192.168.12.1"
//! timeout_secs = 5
//!
//! [poller]
//! min_wait_ms = 9000
//! max_wait_ms = 10000
//! delay_ms = 500
//! fetch_attempts = 3
//! retry_delay_ms = 100
//!
//! [storage]
//! path = "/home/me/.local/share/tmi-stats/stats.db"
//!
//! [speedtest]
//! program = "speedtest"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tmi_core::{PollerConfig, RetryConfig};

/// Longest gateway timeout accepted, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Most fetch attempts accepted per poll.
pub const MAX_FETCH_ATTEMPTS: u32 = 20;

/// Collector configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub poller: PollerSettings,
    pub storage: StorageConfig,
    pub speedtest: SpeedTestConfig,
}

impl Config {
    /// Load configuration from the default path, or defaults if it doesn't exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.gateway.validate());
        errors.extend(self.poller.validate());
        errors.extend(self.storage.validate());
        errors.extend(self.speedtest.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Gateway connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway host name or address, optionally with a port.
    pub host: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: tmi_core::DEFAULT_HOST.to_string(),
            timeout_secs: tmi_core::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let host = self.host.trim();
        if host.is_empty() {
            errors.push(ValidationError::new("gateway.host", "host cannot be empty"));
        } else if host.contains('/') {
            errors.push(ValidationError::new(
                "gateway.host",
                format!("'{host}' must be a bare host name or address, without scheme or path"),
            ));
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            errors.push(ValidationError::new(
                "gateway.timeout_secs",
                format!("must be between 1 and {MAX_TIMEOUT_SECS} seconds"),
            ));
        }

        errors
    }
}

/// Stabilization and retry timings, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    pub min_wait_ms: u64,
    pub max_wait_ms: u64,
    pub delay_ms: u64,
    pub fetch_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for PollerSettings {
    fn default() -> Self {
        let defaults = PollerConfig::default();
        Self {
            min_wait_ms: millis(defaults.min_wait),
            max_wait_ms: millis(defaults.max_wait),
            delay_ms: millis(defaults.delay),
            fetch_attempts: defaults.retry.attempts(),
            retry_delay_ms: millis(defaults.retry.delay),
        }
    }
}

impl PollerSettings {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.max_wait_ms < self.min_wait_ms {
            errors.push(ValidationError::new(
                "poller.max_wait_ms",
                format!(
                    "{} is shorter than poller.min_wait_ms ({})",
                    self.max_wait_ms, self.min_wait_ms
                ),
            ));
        }
        if self.delay_ms == 0 {
            errors.push(ValidationError::new("poller.delay_ms", "must be non-zero"));
        }
        if self.fetch_attempts == 0 || self.fetch_attempts > MAX_FETCH_ATTEMPTS {
            errors.push(ValidationError::new(
                "poller.fetch_attempts",
                format!("must be between 1 and {MAX_FETCH_ATTEMPTS}"),
            ));
        }

        errors
    }

    /// Convert to the poller's own configuration type.
    pub fn to_poller_config(&self) -> PollerConfig {
        PollerConfig::default()
            .min_wait(Duration::from_millis(self.min_wait_ms))
            .max_wait(Duration::from_millis(self.max_wait_ms))
            .delay(Duration::from_millis(self.delay_ms))
            .retry(RetryConfig::fixed(
                self.fetch_attempts,
                Duration::from_millis(self.retry_delay_ms),
            ))
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: tmi_store::default_db_path(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.path",
                "database path cannot be empty",
            ));
        }
        errors
    }
}

/// Speed-test tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedTestConfig {
    /// Executable name or path of the Ookla CLI.
    pub program: String,
}

impl Default for SpeedTestConfig {
    fn default() -> Self {
        Self {
            program: tmi_core::speedtest::DEFAULT_PROGRAM.to_string(),
        }
    }
}

impl SpeedTestConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.program.trim().is_empty() {
            errors.push(ValidationError::new(
                "speedtest.program",
                "program cannot be empty",
            ));
        }
        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The field path (e.g., `poller.delay_ms`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tmi-stats")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_validates() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_default_poller_settings_match_poller_defaults() {
        let settings = PollerSettings::default();
        assert_eq!(settings.min_wait_ms, 9000);
        assert_eq!(settings.max_wait_ms, 10000);
        assert_eq!(settings.delay_ms, 500);
        assert_eq!(settings.fetch_attempts, 3);
        assert_eq!(settings.retry_delay_ms, 100);

        let poller = settings.to_poller_config();
        assert_eq!(poller.min_wait, Duration::from_millis(9000));
        assert_eq!(poller.retry.attempts(), 3);
        poller.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [gateway]
            host = "10.0.0.1:8080"

            [poller]
            delay_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.gateway.host, "10.0.0.1:8080");
        assert_eq!(config.gateway.timeout_secs, 5);
        assert_eq!(config.poller.delay_ms, 250);
        assert_eq!(config.poller.min_wait_ms, 9000);
        assert_eq!(config.speedtest.program, "speedtest");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        let mut config = Config::default();
        config.gateway.host = "gateway.lan".to_string();
        config.storage.path = PathBuf::from("/tmp/stats.db");
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_nonexistent() {
        let result = Config::load("/nonexistent/tmi-stats/config.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gateway\nhost = ").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validation_collects_every_error() {
        let mut config = Config::default();
        config.gateway.host = "http://192.168.12.1/".to_string();
        config.gateway.timeout_secs = 0;
        config.poller.min_wait_ms = 20_000;
        config.poller.delay_ms = 0;
        config.poller.fetch_attempts = 0;
        config.speedtest.program = " ".to_string();

        let Err(ConfigError::Validation(errors)) = config.validate() else {
            panic!("expected validation errors");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "gateway.host",
                "gateway.timeout_secs",
                "poller.max_wait_ms",
                "poller.delay_ms",
                "poller.fetch_attempts",
                "speedtest.program",
            ]
        );
    }

    #[test]
    fn test_validation_error_display() {
        let error = ConfigError::Validation(vec![ValidationError::new(
            "poller.delay_ms",
            "must be non-zero",
        )]);
        assert_eq!(
            error.to_string(),
            "Configuration validation failed:\n  - poller.delay_ms: must be non-zero"
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("tmi-stats/config.toml"));
    }
}
