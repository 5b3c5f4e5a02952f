//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;
pub mod events;
pub mod overrides;

use axum::Router;
use axum::routing::{delete, get, put};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Devices
        .route("/devices", get(devices::list))
        .route("/devices/{id}", get(devices::get))
        // Recurring events
        .route("/events", get(events::list).post(events::create))
        .route(
            "/events/{index}",
            put(events::update).delete(events::remove),
        )
        // Overrides
        .route("/overrides", get(overrides::list).post(overrides::create))
        .route("/overrides/{index}", delete(overrides::remove))
}
