//! # homeauto-app
//!
//! Application layer — the scheduler engine, the shared state handle, and
//! **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `MessagingSession` — sans-IO publish/subscribe session
//!   - `ScheduleStorage` — load & save the schedule
//! - Provide the **Scheduler Engine** that resolves desired device states
//! - Provide the **Hub**, the lock-guarded handle shared by the connection
//!   loop and the HTTP adapter, with the schedule mutation entry points
//! - Provide the **sync step** run by the connection loop on every wake-up
//!
//! ## Dependency rule
//! Depends on `homeauto-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod hub;
pub mod ports;
pub mod scheduler;
pub mod sync;
