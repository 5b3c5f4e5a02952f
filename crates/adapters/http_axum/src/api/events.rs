//! JSON REST handlers for recurring events.
//!
//! Every mutation answers with the full event list as it stands afterwards.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use homeauto_app::hub::EventSpec;
use homeauto_domain::schedule::RecurringEvent;

use crate::state::AppState;

/// Request body for creating or replacing an event.
#[derive(Debug, Deserialize)]
pub struct EventRequest {
    /// Device index, or `-1` for every device.
    pub target: i64,
    pub hour: u32,
    pub minute: u32,
    pub duration_minutes: u32,
    /// `0` = daily, `1..=7` = Sunday..Saturday.
    pub recurrence: u8,
}

impl From<EventRequest> for EventSpec {
    fn from(req: EventRequest) -> Self {
        Self {
            target: req.target,
            hour: req.hour,
            minute: req.minute,
            duration_minutes: req.duration_minutes,
            recurrence: req.recurrence,
        }
    }
}

/// Response of every events endpoint.
pub enum ListResponse {
    Ok(Json<Vec<RecurringEvent>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

impl ListResponse {
    fn current(state: &AppState) -> Self {
        Self::Ok(Json(state.hub.events()))
    }
}

/// `GET /api/events`
pub async fn list(State(state): State<AppState>) -> ListResponse {
    ListResponse::current(&state)
}

/// `POST /api/events`
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<EventRequest>,
) -> ListResponse {
    state.hub.add_events(req.into());
    ListResponse::current(&state)
}

/// `PUT /api/events/{index}`
pub async fn update(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(req): Json<EventRequest>,
) -> ListResponse {
    state.hub.edit_event(index, req.into());
    ListResponse::current(&state)
}

/// `DELETE /api/events/{index}`
pub async fn remove(State(state): State<AppState>, Path(index): Path<usize>) -> ListResponse {
    state.hub.delete_event(index);
    ListResponse::current(&state)
}
