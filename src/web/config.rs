use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::czml::StreamSettings;
use crate::session::Timeline;
use crate::telemetry::DEFAULT_ENDPOINT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub telemetry: TelemetryConfig,
    pub web: WebConfig,
    pub clock: ClockConfig,
    pub stream: StreamSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub endpoint: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
    pub static_dir: PathBuf,
    #[serde(with = "crate::utils::duration")]
    pub shutdown_grace: Duration,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            static_dir: PathBuf::from("static"),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// Offset applied to the wall clock for every emitted timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    #[serde(with = "crate::utils::signed_duration")]
    pub offset: chrono::Duration,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.telemetry.endpoint.trim().is_empty() {
            return invalid("telemetry.endpoint must not be empty");
        }
        if self.web.bind.trim().is_empty() {
            return invalid("web.bind must not be empty");
        }
        if self.web.shutdown_grace.is_zero() {
            return invalid("web.shutdown_grace must be positive");
        }
        if self.stream.window.is_zero() {
            return invalid("stream.window must be positive");
        }
        if self.stream.model.scale.is_nan() || self.stream.model.scale <= 0.0 {
            return invalid("stream.model.scale must be positive");
        }
        if self.stream.path.width == 0 {
            return invalid("stream.path.width must be positive");
        }
        Ok(())
    }

    pub fn timeline(&self) -> Timeline {
        Timeline::new(self.clock.offset)
    }
}
