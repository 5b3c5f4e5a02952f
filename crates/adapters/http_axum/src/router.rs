//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Merges API routes under `/api` and dashboard routes at `/`. At most
/// `max_in_flight` requests are served at once; further requests wait for a
/// slot. Includes a [`TraceLayer`] that logs each HTTP request/response at
/// the `DEBUG` level.
pub fn build(state: AppState, max_in_flight: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .merge(crate::dashboard::routes())
        .layer(ConcurrencyLimitLayer::new(max_in_flight.max(1)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
