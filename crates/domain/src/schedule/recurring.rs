//! Recurring events — weekly windows that switch devices to a target state.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::window;
use crate::device::{DeviceTarget, SwitchState};
use crate::error::ValidationError;
use crate::time::MAX_DURATION_MINUTES;

/// How often a [`RecurringEvent`] repeats.
///
/// Persisted as a numeric code: `0` for daily, `1..=7` for Sunday through
/// Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Recurrence {
    Daily,
    Weekly(Weekday),
}

impl Recurrence {
    /// Every recurrence, in code order.
    pub const ALL: [Self; 8] = [
        Self::Daily,
        Self::Weekly(Weekday::Sun),
        Self::Weekly(Weekday::Mon),
        Self::Weekly(Weekday::Tue),
        Self::Weekly(Weekday::Wed),
        Self::Weekly(Weekday::Thu),
        Self::Weekly(Weekday::Fri),
        Self::Weekly(Weekday::Sat),
    ];

    /// Parse a numeric recurrence code.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownRecurrence`] for codes above `7`.
    pub fn from_code(code: u8) -> Result<Self, ValidationError> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(ValidationError::UnknownRecurrence(code))
    }

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Daily => 0,
            Self::Weekly(day) => {
                // num_days_from_sunday is always < 7
                u8::try_from(day.num_days_from_sunday()).unwrap_or(0) + 1
            }
        }
    }

    /// Days of the week (0 = Sunday) on which the window opens.
    fn days(self) -> impl Iterator<Item = u32> {
        let (first, last) = match self {
            Self::Daily => (0, 6),
            Self::Weekly(day) => {
                let n = day.num_days_from_sunday();
                (n, n)
            }
        };
        first..=last
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Daily => "Daily",
            Self::Weekly(Weekday::Sun) => "Sunday",
            Self::Weekly(Weekday::Mon) => "Monday",
            Self::Weekly(Weekday::Tue) => "Tuesday",
            Self::Weekly(Weekday::Wed) => "Wednesday",
            Self::Weekly(Weekday::Thu) => "Thursday",
            Self::Weekly(Weekday::Fri) => "Friday",
            Self::Weekly(Weekday::Sat) => "Saturday",
        };
        f.write_str(name)
    }
}

impl From<Recurrence> for u8 {
    fn from(recurrence: Recurrence) -> Self {
        recurrence.code()
    }
}

impl TryFrom<u8> for Recurrence {
    type Error = ValidationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

/// Wall-clock start of a window, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimeOfDay`] unless `hour < 24` and
    /// `minute < 60`.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        if hour >= 24 || minute >= 60 {
            return Err(ValidationError::InvalidTimeOfDay { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    #[must_use]
    pub fn hour(self) -> u32 {
        self.hour
    }

    #[must_use]
    pub fn minute(self) -> u32 {
        self.minute
    }

    /// The time of day `minutes` later, wrapping at midnight.
    #[must_use]
    pub fn plus_minutes(self, minutes: u32) -> Self {
        let total = (self.hour * 60 + self.minute + minutes % (24 * 60)) % (24 * 60);
        Self {
            hour: total / 60,
            minute: total % 60,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A weekly-recurring window mapped to a target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecurringEvent {
    pub start: TimeOfDay,
    pub duration_minutes: u32,
    pub target_state: SwitchState,
    pub recurrence: Recurrence,
    pub target: DeviceTarget,
}

impl RecurringEvent {
    /// Create an event that switches its target on for the window.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DurationTooLong`] when the window is longer
    /// than one week.
    pub fn new(
        start: TimeOfDay,
        duration_minutes: u32,
        recurrence: Recurrence,
        target: DeviceTarget,
    ) -> Result<Self, ValidationError> {
        if duration_minutes > MAX_DURATION_MINUTES {
            return Err(ValidationError::DurationTooLong(duration_minutes));
        }
        Ok(Self {
            start,
            duration_minutes,
            target_state: SwitchState::On,
            recurrence,
            target,
        })
    }

    /// Build an event from the raw numeric fields used by forms and the
    /// persisted format.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found among the fields.
    pub fn from_raw(
        target: i64,
        hour: u32,
        minute: u32,
        duration_minutes: u32,
        recurrence_code: u8,
    ) -> Result<Self, ValidationError> {
        let recurrence = Recurrence::from_code(recurrence_code)?;
        let target = DeviceTarget::from_code(target)?;
        let start = TimeOfDay::new(hour, minute)?;
        Self::new(start, duration_minutes, recurrence, target)
    }

    /// Whether the window contains `point` (seconds since Sunday 00:00 UTC).
    #[must_use]
    pub fn contains(&self, point: u32) -> bool {
        let duration_secs = self.duration_minutes * 60;
        self.recurrence.days().any(|day| {
            let start = window::start_offset(day, self.start.hour(), self.start.minute());
            window::contains(start, duration_secs, point)
        })
    }

    /// Wall-clock end of the window.
    #[must_use]
    pub fn end(&self) -> TimeOfDay {
        self.start.plus_minutes(self.duration_minutes)
    }
}
