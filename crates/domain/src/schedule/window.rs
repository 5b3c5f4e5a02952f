//! Week-relative time windows.

use crate::time::WEEK_SECS;

/// Whether `point` (seconds since Sunday 00:00) falls in the half-open window
/// `[start, start + duration_secs)`.
///
/// A window that runs past the end of the week carries over into the start
/// of the next one. A zero-length window never matches.
#[must_use]
pub fn contains(start: u32, duration_secs: u32, point: u32) -> bool {
    let end = start.saturating_add(duration_secs);
    if start <= point && point < end {
        return true;
    }
    end > WEEK_SECS && point < end - WEEK_SECS
}

/// Offset of `hour:minute` on day `day` (0 = Sunday), in seconds.
#[must_use]
pub fn start_offset(day: u32, hour: u32, minute: u32) -> u32 {
    ((day * 24 + hour) * 60 + minute) * 60
}
