//! # homeauto-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a small **JSON API** over the device registry and the schedule
//!   (`/api/devices`, `/api/events`, `/api/overrides`)
//! - Serve a **server-side-rendered HTML dashboard** that works with
//!   **zero JavaScript**: a device status page, the weekly schedule and the
//!   overrides, each with plain `<form>` controls
//! - Map HTTP requests onto the [`Hub`](homeauto_app::hub::Hub) mutation
//!   entry points
//!
//! ## Lenient mutations
//! Schedule mutations never fail visibly. An invalid definition or an
//! out-of-range index leaves the schedule as it was; the API answers with the
//! current list and the dashboard redirects back to the page.
//!
//! ## Dependency rule
//! Depends on `homeauto-app` (for the hub) and `homeauto-domain` (for domain
//! types used in request/response mapping). Never leaks axum types into the
//! domain.

#[allow(clippy::unused_async)]
pub mod api;
#[allow(clippy::unused_async)]
pub mod dashboard;
pub mod error;
pub mod router;
pub mod state;
