//! Server-side rendered HTML dashboard (no JavaScript).
//!
//! Form fields are parsed leniently: a field that does not parse turns the
//! submission into a no-op, and the page is shown again unchanged.

pub mod overrides;
pub mod schedule;
pub mod status;

use axum::Router;
use axum::routing::{get, post};

use homeauto_domain::device::{Device, DeviceTarget};

use crate::state::AppState;

/// Build the dashboard sub-router for SSR HTML pages.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(status::index))
        .route("/schedule", get(schedule::page))
        .route("/addevent", post(schedule::add))
        .route("/schedule/{index}/delete", post(schedule::remove))
        .route("/overrides", get(overrides::page).post(overrides::add))
        .route("/overrides/{index}/delete", post(overrides::remove))
}

/// One `<option>` of a `<select>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    fn new(value: impl ToString, label: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            label: label.into(),
        }
    }
}

/// Device picker entries: every device, then "ALL".
fn device_choices(devices: &[Device]) -> Vec<Choice> {
    devices
        .iter()
        .map(|dev| Choice::new(dev.id, dev.name.clone()))
        .chain(std::iter::once(Choice::new(
            DeviceTarget::All.code(),
            "ALL",
        )))
        .collect()
}

/// Display name of a schedule target.
fn target_label(devices: &[Device], target: DeviceTarget) -> String {
    match target {
        DeviceTarget::All => "ALL".to_string(),
        DeviceTarget::Device(id) => devices
            .iter()
            .find(|dev| dev.id == id)
            .map_or_else(|| format!("device #{id}"), |dev| dev.name.clone()),
    }
}

/// `90` → `1h30m`, `45` → `45m`, `120` → `2h`.
fn format_duration(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h{m}m"),
    }
}

/// Parse an optional form field, trimming whitespace.
fn field<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}
