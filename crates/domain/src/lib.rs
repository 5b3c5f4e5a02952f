//! # homeauto-domain
//!
//! Pure domain model for the homeauto switch scheduler.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps, week-time arithmetic
//! - Define **Devices** (binary switches addressed by a pub/sub topic) and the
//!   ordered **Device Registry**
//! - Define the **Schedule**: recurring weekly events and one-shot overrides,
//!   kept in an ordered **Schedule Store**
//! - Contain all invariant enforcement (recurrence codes, duration limits)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod device;
pub mod schedule;
