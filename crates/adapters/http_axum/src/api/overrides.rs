//! JSON REST handlers for overrides.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use homeauto_app::hub::OverrideSpec;
use homeauto_domain::device::SwitchState;
use homeauto_domain::schedule::Override;

use crate::state::AppState;

/// Request body for creating an override.
#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    /// Device index, or `-1` for every device.
    pub target: i64,
    /// Minutes from now until the override opens.
    #[serde(default)]
    pub offset_minutes: i64,
    pub duration_minutes: u32,
    pub state: SwitchState,
}

impl From<OverrideRequest> for OverrideSpec {
    fn from(req: OverrideRequest) -> Self {
        Self {
            target: req.target,
            offset_minutes: req.offset_minutes,
            duration_minutes: req.duration_minutes,
            state: req.state,
        }
    }
}

/// Response of every overrides endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Override>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/overrides`
pub async fn list(State(state): State<AppState>) -> ListResponse {
    ListResponse::Ok(Json(state.hub.overrides()))
}

/// `POST /api/overrides`
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<OverrideRequest>,
) -> ListResponse {
    state.hub.add_override(req.into());
    ListResponse::Ok(Json(state.hub.overrides()))
}

/// `DELETE /api/overrides/{index}`
pub async fn remove(State(state): State<AppState>, Path(index): Path<usize>) -> ListResponse {
    state.hub.delete_override(index);
    ListResponse::Ok(Json(state.hub.overrides()))
}
