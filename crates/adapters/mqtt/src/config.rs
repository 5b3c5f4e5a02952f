//! MQTT broker connection configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the broker connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub host: String,
    /// MQTT broker port.
    pub port: u16,
    /// Login name; empty means anonymous.
    pub username: String,
    /// Password sent along with `username`.
    pub password: String,
    /// Client identifiers are `<prefix>_<pid>`.
    pub client_id_prefix: String,
    /// Keep-alive interval in seconds. `0` disables pings.
    pub keep_alive_secs: u16,
    /// Fixed delay between reconnect attempts, in seconds.
    pub reconnect_delay_secs: u64,
    /// Upper bound on one socket wait, in seconds. Also the scheduler cadence
    /// when the link is idle.
    pub poll_timeout_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            username: String::new(),
            password: String::new(),
            client_id_prefix: "homeauto".to_string(),
            keep_alive_secs: 30,
            reconnect_delay_secs: 5,
            poll_timeout_secs: 5,
        }
    }
}

impl MqttConfig {
    /// Client identifier for this process.
    #[must_use]
    pub fn client_id(&self) -> String {
        format!("{}_{}", self.client_id_prefix, std::process::id())
    }

    /// Username/password pair, if a username is configured.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() {
            None
        } else {
            Some((self.username.as_str(), self.password.as_str()))
        }
    }

    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(u64::from(self.keep_alive_secs))
    }

    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    #[must_use]
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = MqttConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 1883);
        assert_eq!(config.client_id_prefix, "homeauto");
        assert_eq!(config.keep_alive_secs, 30);
        assert_eq!(config.reconnect_delay(), Duration::from_secs(5));
        assert_eq!(config.poll_timeout(), Duration::from_secs(5));
        assert!(config.credentials().is_none());
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            host = "mqtt.example.com"
            port = 8883
            username = "hub"
            password = "secret"
            client_id_prefix = "cellar"
            keep_alive_secs = 60
            reconnect_delay_secs = 2
            poll_timeout_secs = 1
        "#;
        let config: MqttConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.host, "mqtt.example.com");
        assert_eq!(config.port, 8883);
        assert_eq!(config.credentials(), Some(("hub", "secret")));
        assert_eq!(config.keep_alive(), Duration::from_secs(60));
        assert_eq!(config.reconnect_delay(), Duration::from_secs(2));
        assert_eq!(config.poll_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let toml = r#"host = "192.168.1.100""#;
        let config: MqttConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.host, "192.168.1.100");
        assert_eq!(config.port, 1883);
        assert_eq!(config.client_id_prefix, "homeauto");
    }

    #[test]
    fn should_suffix_client_id_with_process_id() {
        let config = MqttConfig::default();
        assert_eq!(
            config.client_id(),
            format!("homeauto_{}", std::process::id())
        );
    }

    #[test]
    fn should_never_use_zero_poll_timeout() {
        let config = MqttConfig {
            poll_timeout_secs: 0,
            ..MqttConfig::default()
        };
        assert_eq!(config.poll_timeout(), Duration::from_secs(1));
    }
}
