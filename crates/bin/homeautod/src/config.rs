//! Configuration loading — TOML file with environment variable overrides.
//!
//! The file path is the first command-line argument, else `HOMEAUTO_CONFIG`,
//! else `homeauto.toml` in the working directory. Every field has a sensible
//! default so the file is optional. Environment variables take precedence
//! over file values.

use std::collections::HashSet;
use std::path::PathBuf;

use homeauto_adapter_mqtt::MqttConfig;
use homeauto_domain::device::{DeviceRegistry, SwitchState};
use serde::Deserialize;

const DEFAULT_PATH: &str = "homeauto.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub http: HttpConfig,
    /// Broker connection settings.
    pub mqtt: MqttConfig,
    /// Schedule persistence and resolution settings.
    pub schedule: ScheduleConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Controlled switches, in id order.
    pub devices: Vec<DeviceConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Runtime worker threads.
    pub threads: usize,
    /// Requests served concurrently.
    pub connection_limit: usize,
}

/// Schedule configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Schedule file, loaded at startup and written at shutdown.
    pub path: PathBuf,
    /// State of a device no window matches: `on` or `off`.
    pub default_state: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// One `[[devices]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub topic: String,
}

impl Config {
    /// Load configuration from `path` (or the default location) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let path = path
            .map(str::to_string)
            .or_else(|| std::env::var("HOMEAUTO_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("HOMEAUTO_HOST") {
            self.http.host = val;
        }
        if let Some(port) = var("HOMEAUTO_PORT").and_then(|val| val.parse().ok()) {
            self.http.port = port;
        }
        if let Some(val) = var("HOMEAUTO_MQTT_HOST") {
            self.mqtt.host = val;
        }
        if let Some(port) = var("HOMEAUTO_MQTT_PORT").and_then(|val| val.parse().ok()) {
            self.mqtt.port = port;
        }
        if let Some(val) = var("HOMEAUTO_SCHEDULE") {
            self.schedule.path = PathBuf::from(val);
        }
        if let Some(val) = var("HOMEAUTO_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Validation(
                "http.port must be non-zero".to_string(),
            ));
        }
        if self.mqtt.port == 0 {
            return Err(ConfigError::Validation(
                "mqtt.port must be non-zero".to_string(),
            ));
        }
        if self.http.threads == 0 {
            return Err(ConfigError::Validation(
                "http.threads must be at least 1".to_string(),
            ));
        }
        self.default_state()?;

        let mut seen = HashSet::new();
        for device in &self.devices {
            if !seen.insert(device.topic.trim()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate device topic {:?}",
                    device.topic
                )));
            }
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }

    /// State applied to devices outside every window.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] unless the value is `on` or `off`.
    pub fn default_state(&self) -> Result<SwitchState, ConfigError> {
        match self.schedule.default_state.parse() {
            Ok(state @ (SwitchState::On | SwitchState::Off)) => Ok(state),
            _ => Err(ConfigError::Validation(format!(
                "schedule.default_state must be \"on\" or \"off\", got {:?}",
                self.schedule.default_state
            ))),
        }
    }

    /// Build the device registry from the `[[devices]]` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when an entry has an empty name or
    /// topic.
    pub fn registry(&self) -> Result<DeviceRegistry, ConfigError> {
        let mut registry = DeviceRegistry::new();
        for device in &self.devices {
            registry
                .register(&device.name, &device.topic)
                .map_err(|err| ConfigError::Validation(format!("device {:?}: {err}", device.name)))?;
        }
        Ok(registry)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            threads: 4,
            connection_limit: 32,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("schedule.cfg"),
            default_state: "off".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homeautod=info,homeauto=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
