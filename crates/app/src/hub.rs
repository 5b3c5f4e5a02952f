//! Hub — the shared state handle.
//!
//! Device Registry, Schedule Store, and the scheduler's latch live behind one
//! mutex. The connection loop holds the lock for a whole drain-tick-publish
//! step via [`Hub::lock`]; HTTP handlers go through the accessor and mutation
//! methods, each of which holds the lock for exactly one read or write.
//!
//! Mutations follow lenient semantics: invalid definitions and out-of-range
//! indices leave the store untouched and report `false`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use homeauto_domain::device::{Device, DeviceId, DeviceRegistry, DeviceTarget, SwitchState};
use homeauto_domain::error::HomeAutoError;
use homeauto_domain::schedule::{Override, RecurringEvent, ScheduleStore};
use homeauto_domain::time::{self, Timestamp};

use crate::ports::ScheduleStorage;
use crate::scheduler::Scheduler;

/// Raw fields of a recurring event as entered by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSpec {
    /// Device index, or `-1` for every device.
    pub target: i64,
    pub hour: u32,
    pub minute: u32,
    pub duration_minutes: u32,
    /// `0` = daily, `1..=7` = Sunday..Saturday.
    pub recurrence: u8,
}

impl EventSpec {
    fn to_event(self) -> Option<RecurringEvent> {
        RecurringEvent::from_raw(
            self.target,
            self.hour,
            self.minute,
            self.duration_minutes,
            self.recurrence,
        )
        .inspect_err(|err| tracing::debug!(%err, "ignoring invalid event"))
        .ok()
    }
}

/// Raw fields of an override as entered by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideSpec {
    /// Device index, or `-1` for every device.
    pub target: i64,
    /// Minutes from now until the override opens.
    pub offset_minutes: i64,
    pub duration_minutes: u32,
    pub state: SwitchState,
}

/// Everything guarded by the hub's lock.
#[derive(Debug)]
pub struct HubState {
    pub devices: DeviceRegistry,
    pub schedule: ScheduleStore,
    pub scheduler: Scheduler,
}

impl HubState {
    /// Run one scheduler tick over the guarded data.
    pub fn tick(&mut self, now: Timestamp) -> Vec<DeviceId> {
        self.scheduler
            .tick(&mut self.devices, &self.schedule, now)
    }
}

/// Cloneable handle to the shared state.
#[derive(Debug, Clone)]
pub struct Hub {
    inner: Arc<Mutex<HubState>>,
}

impl Hub {
    #[must_use]
    pub fn new(devices: DeviceRegistry, schedule: ScheduleStore, default_state: SwitchState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubState {
                devices,
                schedule,
                scheduler: Scheduler::new(default_state),
            })),
        }
    }

    /// Acquire the lock for a multi-step operation.
    ///
    /// A poisoned lock is recovered: every operation leaves the state
    /// consistent before it can panic.
    pub fn lock(&self) -> MutexGuard<'_, HubState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the device registry.
    #[must_use]
    pub fn devices(&self) -> Vec<Device> {
        self.lock().devices.to_vec()
    }

    /// Snapshot of the recurring events, in store order.
    #[must_use]
    pub fn events(&self) -> Vec<RecurringEvent> {
        self.lock().schedule.events().to_vec()
    }

    /// Snapshot of the overrides, in store order.
    #[must_use]
    pub fn overrides(&self) -> Vec<Override> {
        self.lock().schedule.overrides().to_vec()
    }

    /// Snapshot of the whole schedule.
    #[must_use]
    pub fn schedule(&self) -> ScheduleStore {
        self.lock().schedule.clone()
    }

    #[must_use]
    pub fn default_state(&self) -> SwitchState {
        self.lock().scheduler.default_state()
    }

    /// Append a recurring event. No-op when the definition is invalid.
    #[tracing::instrument(skip(self))]
    pub fn add_events(&self, spec: EventSpec) -> bool {
        let Some(event) = spec.to_event() else {
            return false;
        };
        self.lock().schedule.add_event(event);
        tracing::info!(start = %event.start, recurrence = %event.recurrence, "event added");
        true
    }

    /// Replace the recurring event at `index`. No-op when the index is out of
    /// range or the definition is invalid.
    #[tracing::instrument(skip(self))]
    pub fn edit_event(&self, index: usize, spec: EventSpec) -> bool {
        let Some(event) = spec.to_event() else {
            return false;
        };
        let edited = self.lock().schedule.edit_event(index, event);
        if edited {
            tracing::info!("event edited");
        } else {
            tracing::debug!("ignoring edit of unknown event");
        }
        edited
    }

    /// Remove the recurring event at `index`. No-op when out of range.
    #[tracing::instrument(skip(self))]
    pub fn delete_event(&self, index: usize) -> bool {
        let deleted = self.lock().schedule.delete_event(index).is_some();
        if deleted {
            tracing::info!("event deleted");
        }
        deleted
    }

    /// Append an override opening `offset_minutes` from now.
    pub fn add_override(&self, spec: OverrideSpec) -> bool {
        self.add_override_at(time::now(), spec)
    }

    /// Append an override opening `offset_minutes` after `now`.
    #[tracing::instrument(skip(self))]
    pub fn add_override_at(&self, now: Timestamp, spec: OverrideSpec) -> bool {
        let item = DeviceTarget::from_code(spec.target).and_then(|target| {
            Override::starting_in(
                now,
                spec.offset_minutes,
                spec.duration_minutes,
                spec.state,
                target,
            )
        });
        match item {
            Ok(item) => {
                self.lock().schedule.add_override(item);
                tracing::info!(start_epoch = item.start_epoch, "override added");
                true
            }
            Err(err) => {
                tracing::debug!(%err, "ignoring invalid override");
                false
            }
        }
    }

    /// Remove the override at `index`. No-op when out of range.
    #[tracing::instrument(skip(self))]
    pub fn delete_override(&self, index: usize) -> bool {
        let deleted = self.lock().schedule.delete_override(index).is_some();
        if deleted {
            tracing::info!("override deleted");
        }
        deleted
    }

    /// Persist a snapshot of the schedule.
    ///
    /// The lock is released before the storage is awaited.
    ///
    /// # Errors
    ///
    /// Propagates the storage error.
    pub async fn save_schedule<S: ScheduleStorage>(&self, storage: &S) -> Result<(), HomeAutoError> {
        let snapshot = self.schedule();
        let events = snapshot.events().len();
        let overrides = snapshot.overrides().len();
        storage.save(snapshot).await?;
        tracing::info!(events, overrides, "schedule saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::future::Future;

    fn hub() -> Hub {
        let mut devices = DeviceRegistry::new();
        devices.register("Heater", "home/heater").unwrap();
        devices.register("Lamp", "home/lamp").unwrap();
        Hub::new(devices, ScheduleStore::new(), SwitchState::Off)
    }

    fn spec(hour: u32) -> EventSpec {
        EventSpec {
            target: 1,
            hour,
            minute: 0,
            duration_minutes: 60,
            recurrence: 0,
        }
    }

    #[test]
    fn should_add_valid_event() {
        let hub = hub();
        assert!(hub.add_events(spec(8)));
        assert_eq!(hub.events().len(), 1);
        assert_eq!(hub.events()[0].target, DeviceTarget::Device(DeviceId::new(1)));
    }

    #[test]
    fn should_leave_store_unchanged_on_invalid_add() {
        let hub = hub();
        hub.add_events(spec(8));
        let before = hub.schedule();

        assert!(!hub.add_events(EventSpec {
            recurrence: 8,
            ..spec(9)
        }));
        assert!(!hub.add_events(EventSpec {
            duration_minutes: 10_081,
            ..spec(9)
        }));
        assert_eq!(hub.schedule(), before);
    }

    #[test]
    fn should_leave_store_unchanged_on_out_of_range_index() {
        let hub = hub();
        hub.add_events(spec(8));
        let before = hub.schedule();

        assert!(!hub.edit_event(1, spec(9)));
        assert!(!hub.delete_event(3));
        assert!(!hub.delete_override(0));
        assert_eq!(hub.schedule(), before);
    }

    #[test]
    fn should_edit_and_delete_event() {
        let hub = hub();
        hub.add_events(spec(8));
        assert!(hub.edit_event(0, spec(10)));
        assert_eq!(hub.events()[0].start.hour(), 10);
        assert!(hub.delete_event(0));
        assert!(hub.events().is_empty());
    }

    #[test]
    fn should_add_override_relative_to_now() {
        let hub = hub();
        let now = Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap();
        assert!(hub.add_override_at(
            now,
            OverrideSpec {
                target: -1,
                offset_minutes: 5,
                duration_minutes: 30,
                state: SwitchState::On,
            }
        ));
        let overrides = hub.overrides();
        assert_eq!(overrides[0].start_epoch, now.timestamp() + 300);
        assert_eq!(overrides[0].target, DeviceTarget::All);
    }

    #[test]
    fn should_reject_override_with_unknown_state() {
        let hub = hub();
        assert!(!hub.add_override(OverrideSpec {
            target: 0,
            offset_minutes: 0,
            duration_minutes: 30,
            state: SwitchState::Unknown,
        }));
        assert!(hub.overrides().is_empty());
    }

    #[test]
    fn should_tick_through_locked_state() {
        let hub = hub();
        hub.add_events(spec(8));
        let now = Utc.with_ymd_and_hms(2024, 1, 3, 8, 30, 0).unwrap();
        let changed = hub.lock().tick(now);
        assert_eq!(changed.len(), 2);
        let statuses: Vec<_> = hub.devices().iter().map(|dev| dev.status).collect();
        assert_eq!(statuses, vec![SwitchState::Off, SwitchState::On]);
    }

    #[test]
    fn should_share_state_between_clones() {
        let hub = hub();
        let other = hub.clone();
        other.add_events(spec(8));
        assert_eq!(hub.events().len(), 1);
    }

    struct RecordingStorage {
        saved: Mutex<Option<ScheduleStore>>,
    }

    impl ScheduleStorage for RecordingStorage {
        fn load(&self) -> impl Future<Output = Result<ScheduleStore, HomeAutoError>> + Send {
            async { Ok(ScheduleStore::new()) }
        }

        fn save(
            &self,
            schedule: ScheduleStore,
        ) -> impl Future<Output = Result<(), HomeAutoError>> + Send {
            *self.saved.lock().unwrap() = Some(schedule);
            async { Ok(()) }
        }
    }

    #[tokio::test]
    async fn should_save_schedule_snapshot() {
        let hub = hub();
        hub.add_events(spec(8));
        let storage = RecordingStorage {
            saved: Mutex::new(None),
        };
        hub.save_schedule(&storage).await.unwrap();
        let saved = storage.saved.lock().unwrap().clone().unwrap();
        assert_eq!(saved.events().len(), 1);
    }
}
