//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HomeAutoError`] at port boundaries.

/// Top-level error shared by the domain, application, and adapters.
#[derive(Debug, thiserror::Error)]
pub enum HomeAutoError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced item does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A persistence or transport adapter failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Reasons a value is rejected by the domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("unknown recurrence code {0}")]
    UnknownRecurrence(u8),

    #[error("unknown state code {0}")]
    UnknownState(u8),

    #[error("invalid time of day {hour:02}:{minute:02}")]
    InvalidTimeOfDay { hour: u32, minute: u32 },

    #[error("duration of {0} minutes exceeds one week")]
    DurationTooLong(u32),

    #[error("invalid device target {0}")]
    InvalidTarget(i64),
}

/// A lookup by index or id found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
