//! # homeauto-adapter-mqtt
//!
//! MQTT adapter — keeps the devices' switch states in sync over a broker.
//!
//! ## Responsibilities
//! - Implement the `MessagingSession` port for MQTT 3.1.1 ([`MqttSession`])
//! - Own the broker link: connect, subscribe to every device topic, reconnect
//!   after failures ([`ConnectionLoop`])
//! - Run the scheduler on every wake-up and publish the resulting states
//!
//! ## Dependency rule
//! Same as other adapters: depends on `homeauto-app` and `homeauto-domain`.

mod config;
mod connection;
mod error;
mod session;

pub use config::MqttConfig;
pub use connection::{ConnectionLoop, LinkState};
pub use error::MqttError;
pub use session::{MqttSession, SessionOptions};
