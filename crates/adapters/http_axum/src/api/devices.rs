//! JSON REST handlers for devices.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use homeauto_domain::device::{Device, DeviceId};
use homeauto_domain::error::NotFoundError;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Device>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Device>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/devices`
pub async fn list(State(state): State<AppState>) -> ListResponse {
    ListResponse::Ok(Json(state.hub.devices()))
}

/// `GET /api/devices/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<usize>,
) -> Result<GetResponse, ApiError> {
    let device = state
        .hub
        .lock()
        .devices
        .get(DeviceId::new(id))
        .cloned()
        .ok_or_else(|| NotFoundError {
            entity: "Device",
            id: id.to_string(),
        })?;
    Ok(GetResponse::Ok(Json(device)))
}
