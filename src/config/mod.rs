//! Configuration
//!
//! A small YAML-backed config with serde defaults; every knob has a sane
//! default so a missing file section still validates.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Request executor knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Per-invocation deadline in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Upper bound on in-flight invocations
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_invocations: usize,
}

/// Logging knobs, consumed by the binary's subscriber setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_concurrent() -> usize {
    32
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            max_concurrent_invocations: default_max_concurrent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl BridgeConfig {
    /// Load and validate a YAML config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BridgeConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.executor.timeout_seconds == 0 {
            return Err(BridgeError::config("executor.timeout_seconds must be non-zero"));
        }
        if self.executor.max_concurrent_invocations == 0 {
            return Err(BridgeError::config(
                "executor.max_concurrent_invocations must be non-zero",
            ));
        }
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(BridgeError::config(format!(
                    "unknown logging.level '{}'",
                    other
                )));
            }
        }
        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => {
                return Err(BridgeError::config(format!(
                    "unknown logging.format '{}'",
                    other
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.executor.timeout_seconds, 30);
        assert_eq!(config.executor.max_concurrent_invocations, 32);
        assert_eq!(config.logging.level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: BridgeConfig =
            serde_yaml::from_str("executor:\n  timeout_seconds: 5\n").unwrap();
        assert_eq!(config.executor.timeout_seconds, 5);
        assert_eq!(config.executor.max_concurrent_invocations, 32);
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let config: BridgeConfig =
            serde_yaml::from_str("executor:\n  timeout_seconds: 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_log_level_fails_validation() {
        let config: BridgeConfig = serde_yaml::from_str("logging:\n  level: loud\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "executor:\n  timeout_seconds: 10\n  max_concurrent_invocations: 4\n"
        )
        .unwrap();
        let config = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.executor.timeout_seconds, 10);
        assert_eq!(config.executor.max_concurrent_invocations, 4);
    }
}
