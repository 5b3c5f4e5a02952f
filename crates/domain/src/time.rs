//! Time and timestamp helpers.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// UTC timestamp used for ticks and override windows.
pub type Timestamp = DateTime<Utc>;

/// Length of the schedule cycle: one week, in seconds.
pub const WEEK_SECS: u32 = 7 * 24 * 60 * 60;

/// Longest allowed duration for a schedule entry, in minutes (one week).
pub const MAX_DURATION_MINUTES: u32 = 7 * 24 * 60;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Seconds elapsed since the most recent Sunday 00:00:00 UTC.
///
/// Always in `[0, WEEK_SECS)`.
#[must_use]
pub fn seconds_since_sunday(ts: Timestamp) -> u32 {
    let day = ts.weekday().num_days_from_sunday();
    ((day * 24 + ts.hour()) * 60 + ts.minute()) * 60 + ts.second()
}
