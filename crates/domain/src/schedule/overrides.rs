//! Overrides — one-shot, absolute-time exceptions to the recurring schedule.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::device::{DeviceTarget, SwitchState};
use crate::error::ValidationError;
use crate::time::Timestamp;

/// An absolute time window during which the target is forced to a state.
///
/// Overrides are kept after their window elapses; they simply stop matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Override {
    /// Window start, in UNIX seconds.
    pub start_epoch: i64,
    pub duration_minutes: u32,
    pub target_state: SwitchState,
    pub target: DeviceTarget,
}

impl Override {
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownState`] when `target_state` is
    /// [`SwitchState::Unknown`].
    pub fn new(
        start_epoch: i64,
        duration_minutes: u32,
        target_state: SwitchState,
        target: DeviceTarget,
    ) -> Result<Self, ValidationError> {
        if target_state == SwitchState::Unknown {
            return Err(ValidationError::UnknownState(target_state.code()));
        }
        Ok(Self {
            start_epoch,
            duration_minutes,
            target_state,
            target,
        })
    }

    /// An override opening `offset_minutes` after `now`.
    ///
    /// # Errors
    ///
    /// Same as [`Override::new`].
    pub fn starting_in(
        now: Timestamp,
        offset_minutes: i64,
        duration_minutes: u32,
        target_state: SwitchState,
        target: DeviceTarget,
    ) -> Result<Self, ValidationError> {
        let start_epoch = now
            .timestamp()
            .saturating_add(offset_minutes.saturating_mul(60));
        Self::new(start_epoch, duration_minutes, target_state, target)
    }

    /// Window end, in UNIX seconds. Saturates at `i64::MAX`.
    #[must_use]
    pub fn end_epoch(&self) -> i64 {
        self.start_epoch
            .saturating_add(i64::from(self.duration_minutes) * 60)
    }

    /// Whether `now` lies in `[start, start + duration)`.
    #[must_use]
    pub fn is_active(&self, now: Timestamp) -> bool {
        let t = now.timestamp();
        self.start_epoch <= t && t < self.end_epoch()
    }

    /// Whether the window has fully elapsed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now.timestamp() >= self.end_epoch()
    }

    #[must_use]
    pub fn start(&self) -> Option<Timestamp> {
        DateTime::<Utc>::from_timestamp(self.start_epoch, 0)
    }
}
