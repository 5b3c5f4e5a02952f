//! Dashboard status page — current state of every device.

use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};

use homeauto_domain::device::Device;

use crate::state::AppState;

/// Status page template.
#[derive(Template)]
#[template(path = "status.html")]
pub struct StatusTemplate {
    refresh_seconds: u32,
    default_state: String,
    devices: Vec<Device>,
    event_count: usize,
    override_count: usize,
}

impl IntoResponse for StatusTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

/// `GET /` — device status overview.
pub async fn index(State(state): State<AppState>) -> StatusTemplate {
    let guard = state.hub.lock();
    StatusTemplate {
        refresh_seconds: state.refresh_seconds,
        default_state: guard.scheduler.default_state().to_string(),
        devices: guard.devices.to_vec(),
        event_count: guard.schedule.events().len(),
        override_count: guard.schedule.overrides().len(),
    }
}
