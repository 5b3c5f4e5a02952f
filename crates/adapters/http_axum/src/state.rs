//! Shared application state for axum handlers.

use homeauto_app::hub::Hub;

/// Application state shared across all axum handlers.
///
/// Cloning is cheap: the hub is a handle over shared state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Devices, schedule and scheduler, behind one lock.
    pub hub: Hub,
    /// Auto-refresh interval of the status page, in seconds. `0` disables it.
    pub refresh_seconds: u32,
}

impl AppState {
    #[must_use]
    pub fn new(hub: Hub) -> Self {
        Self {
            hub,
            refresh_seconds: 10,
        }
    }
}
