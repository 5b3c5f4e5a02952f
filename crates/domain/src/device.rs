//! Device — a binary-state switch reachable through one pub/sub topic.
//!
//! Devices are created once at startup from configuration and live in a
//! [`DeviceRegistry`]. A device's id is its index in the registry, so ids are
//! stable for the lifetime of the process.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HomeAutoError, ValidationError};

/// Index-like identifier of a [`Device`] inside the [`DeviceRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(usize);

impl DeviceId {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Last-known or desired state of a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchState {
    #[default]
    Unknown,
    On,
    Off,
}

impl SwitchState {
    /// Interpret an inbound payload. `"1"` means on, anything else off.
    #[must_use]
    pub fn from_payload(payload: &[u8]) -> Self {
        if payload == b"1" { Self::On } else { Self::Off }
    }

    /// Payload published for this state, `None` while the state is unknown.
    #[must_use]
    pub fn as_payload(self) -> Option<&'static str> {
        match self {
            Self::On => Some("1"),
            Self::Off => Some("0"),
            Self::Unknown => None,
        }
    }

    /// Numeric code used by the persisted schedule format.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::On => 1,
            Self::Off => 2,
        }
    }

    /// Parse a persisted state code. Only `On` and `Off` are valid targets.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownState`] for any other code.
    pub fn from_code(code: u8) -> Result<Self, ValidationError> {
        match code {
            1 => Ok(Self::On),
            2 => Ok(Self::Off),
            other => Err(ValidationError::UnknownState(other)),
        }
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

impl FromStr for SwitchState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" | "1" => Ok(Self::On),
            "off" | "0" => Ok(Self::Off),
            "unknown" => Ok(Self::Unknown),
            _ => Err(ValidationError::UnknownState(u8::MAX)),
        }
    }
}

/// Which devices a schedule entry applies to.
///
/// Persisted as `-1` for [`All`](Self::All) and the device index otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum DeviceTarget {
    All,
    Device(DeviceId),
}

impl DeviceTarget {
    /// Numeric form used by the persisted format and the HTTP forms.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::All => -1,
            Self::Device(id) => i64::try_from(id.index()).unwrap_or(i64::MAX),
        }
    }

    /// Parse the numeric form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTarget`] for values below `-1`.
    pub fn from_code(code: i64) -> Result<Self, ValidationError> {
        match code {
            -1 => Ok(Self::All),
            n => usize::try_from(n)
                .map(|index| Self::Device(DeviceId::new(index)))
                .map_err(|_| ValidationError::InvalidTarget(n)),
        }
    }
}

impl From<DeviceTarget> for i64 {
    fn from(target: DeviceTarget) -> Self {
        target.code()
    }
}

impl TryFrom<i64> for DeviceTarget {
    type Error = ValidationError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

/// A controllable switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub topic: String,
    pub status: SwitchState,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeAutoError::Validation`] when `name` or `topic` is empty.
    pub fn validate(&self) -> Result<(), HomeAutoError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.topic.is_empty() {
            return Err(ValidationError::EmptyTopic.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    topic: Option<String>,
    status: Option<SwitchState>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: SwitchState) -> Self {
        self.status = Some(status);
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeAutoError::Validation`] if `name` or `topic` is missing.
    pub fn build(self) -> Result<Device, HomeAutoError> {
        let device = Device {
            id: self.id.unwrap_or(DeviceId::new(0)),
            name: self.name.unwrap_or_default().trim().to_string(),
            topic: self.topic.unwrap_or_default().trim().to_string(),
            status: self.status.unwrap_or_default(),
        };
        device.validate()?;
        Ok(device)
    }
}

/// Ordered collection of devices; a device's id is its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a device, assigning it the next id.
    ///
    /// # Errors
    ///
    /// Returns [`HomeAutoError::Validation`] when `name` or `topic` is empty.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        topic: impl Into<String>,
    ) -> Result<DeviceId, HomeAutoError> {
        let id = DeviceId::new(self.devices.len());
        let device = Device::builder().id(id).name(name).topic(topic).build()?;
        self.devices.push(device);
        Ok(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    #[must_use]
    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(id.index())
    }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.devices.get_mut(id.index())
    }

    /// Record a state echoed on `topic`, returning the matching device id.
    ///
    /// Only the first device with that topic is updated.
    pub fn apply_echo(&mut self, topic: &str, payload: &[u8]) -> Option<DeviceId> {
        let device = self.devices.iter_mut().find(|dev| dev.topic == topic)?;
        device.status = SwitchState::from_payload(payload);
        Some(device.id)
    }

    /// Snapshot of every device, in id order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Device> {
        self.devices.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> DeviceRegistry {
        let mut registry = DeviceRegistry::new();
        registry.register("Heater", "home/heater").unwrap();
        registry.register("Lamp", "home/lamp").unwrap();
        registry
    }

    #[test]
    fn should_assign_ids_in_registration_order() {
        let registry = registry();
        let ids: Vec<_> = registry.iter().map(|dev| dev.id.index()).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn should_start_with_unknown_status() {
        let registry = registry();
        assert!(registry.iter().all(|dev| dev.status == SwitchState::Unknown));
    }

    #[test]
    fn should_reject_empty_topic() {
        let mut registry = DeviceRegistry::new();
        let result = registry.register("Heater", "  ");
        assert!(matches!(
            result,
            Err(HomeAutoError::Validation(ValidationError::EmptyTopic))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn should_apply_echo_to_matching_topic() {
        let mut registry = registry();
        let id = registry.apply_echo("home/lamp", b"1");
        assert_eq!(id, Some(DeviceId::new(1)));
        assert_eq!(
            registry.get(DeviceId::new(1)).map(|dev| dev.status),
            Some(SwitchState::On)
        );
    }

    #[test]
    fn should_treat_any_other_payload_as_off() {
        let mut registry = registry();
        registry.apply_echo("home/heater", b"garbage");
        assert_eq!(
            registry.get(DeviceId::new(0)).map(|dev| dev.status),
            Some(SwitchState::Off)
        );
    }

    #[test]
    fn should_ignore_echo_on_unknown_topic() {
        let mut registry = registry();
        assert_eq!(registry.apply_echo("home/unknown", b"1"), None);
    }

    #[test]
    fn should_map_state_to_payload() {
        assert_eq!(SwitchState::On.as_payload(), Some("1"));
        assert_eq!(SwitchState::Off.as_payload(), Some("0"));
        assert_eq!(SwitchState::Unknown.as_payload(), None);
    }

    #[test]
    fn should_reject_unknown_state_code() {
        assert_eq!(SwitchState::from_code(1), Ok(SwitchState::On));
        assert_eq!(SwitchState::from_code(2), Ok(SwitchState::Off));
        assert_eq!(
            SwitchState::from_code(0),
            Err(ValidationError::UnknownState(0))
        );
    }

    #[test]
    fn should_parse_target_codes() {
        assert_eq!(DeviceTarget::from_code(-1), Ok(DeviceTarget::All));
        assert_eq!(
            DeviceTarget::from_code(3),
            Ok(DeviceTarget::Device(DeviceId::new(3)))
        );
        assert_eq!(
            DeviceTarget::from_code(-2),
            Err(ValidationError::InvalidTarget(-2))
        );
    }

    #[test]
    fn should_serialize_target_as_integer() {
        let json = serde_json::to_string(&DeviceTarget::All).unwrap();
        assert_eq!(json, "-1");
        let parsed: DeviceTarget = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, DeviceTarget::Device(DeviceId::new(2)));
    }
}
