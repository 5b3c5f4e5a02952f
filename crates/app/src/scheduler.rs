//! Scheduler engine — resolves the desired state of every device.
//!
//! Each [`tick`](Scheduler::tick) starts from the default state, applies every
//! recurring event whose window contains the current point of the week (in
//! store order, so the later match wins), then every active override (which
//! therefore outranks all recurring events), and finally diffs the result
//! against the stored device status.

use homeauto_domain::device::{DeviceId, DeviceRegistry, DeviceTarget, SwitchState};
use homeauto_domain::schedule::ScheduleStore;
use homeauto_domain::time::{self, Timestamp};

/// Time-window resolution engine.
#[derive(Debug, Clone)]
pub struct Scheduler {
    default_state: SwitchState,
    needs_push: bool,
}

impl Scheduler {
    /// Create an engine that falls back to `default_state` outside any window.
    #[must_use]
    pub fn new(default_state: SwitchState) -> Self {
        Self {
            default_state,
            needs_push: true,
        }
    }

    #[must_use]
    pub fn default_state(&self) -> SwitchState {
        self.default_state
    }

    /// Whether the next tick should be followed by a full republish.
    ///
    /// Set at construction and by [`request_full_push`](Self::request_full_push),
    /// cleared when a tick completes.
    #[must_use]
    pub fn needs_push(&self) -> bool {
        self.needs_push
    }

    /// Re-arm the full republish latch, e.g. after a reconnect.
    pub fn request_full_push(&mut self) {
        self.needs_push = true;
    }

    /// Desired state of every device at `now`, indexed by device id.
    #[must_use]
    pub fn resolve(
        &self,
        devices: &DeviceRegistry,
        schedule: &ScheduleStore,
        now: Timestamp,
    ) -> Vec<SwitchState> {
        let point = time::seconds_since_sunday(now);
        let mut desired = vec![self.default_state; devices.len()];

        for event in schedule.events() {
            if event.contains(point) {
                apply(&mut desired, event.target, event.target_state);
            }
        }
        for item in schedule.overrides() {
            if item.is_active(now) {
                apply(&mut desired, item.target, item.target_state);
            }
        }

        desired
    }

    /// Resolve, store the result, and return the ids whose status changed,
    /// in ascending order.
    pub fn tick(
        &mut self,
        devices: &mut DeviceRegistry,
        schedule: &ScheduleStore,
        now: Timestamp,
    ) -> Vec<DeviceId> {
        let desired = self.resolve(devices, schedule, now);
        let mut changed = Vec::new();

        for (index, state) in desired.into_iter().enumerate() {
            let id = DeviceId::new(index);
            let Some(device) = devices.get_mut(id) else {
                continue;
            };
            if device.status != state {
                tracing::debug!(device = %id, from = %device.status, to = %state, "device transition");
                device.status = state;
                changed.push(id);
            }
        }

        self.needs_push = false;
        changed
    }
}

/// Overwrite the desired state of the targeted device(s).
///
/// Targets outside the registry are ignored.
fn apply(desired: &mut [SwitchState], target: DeviceTarget, state: SwitchState) {
    match target {
        DeviceTarget::All => desired.fill(state),
        DeviceTarget::Device(id) => {
            if let Some(slot) = desired.get_mut(id.index()) {
                *slot = state;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use homeauto_domain::schedule::{Override, RecurringEvent};

    fn registry(count: usize) -> DeviceRegistry {
        let mut registry = DeviceRegistry::new();
        for i in 0..count {
            registry
                .register(format!("Plug {i}"), format!("plugs/{i}"))
                .unwrap();
        }
        registry
    }

    /// 2024-01-03 is a Wednesday.
    fn wednesday(hour: u32, minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 3, hour, minute, 0).unwrap()
    }

    fn daily(target: i64, hour: u32, minute: u32, duration: u32) -> RecurringEvent {
        RecurringEvent::from_raw(target, hour, minute, duration, 0).unwrap()
    }

    fn override_at(now: Timestamp, target: i64, duration: u32, state: SwitchState) -> Override {
        Override::starting_in(
            now,
            0,
            duration,
            state,
            DeviceTarget::from_code(target).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn should_apply_default_state_outside_windows() {
        let scheduler = Scheduler::new(SwitchState::Off);
        let mut schedule = ScheduleStore::new();
        schedule.add_event(daily(0, 8, 0, 60));
        let desired = scheduler.resolve(&registry(2), &schedule, wednesday(12, 0));
        assert_eq!(desired, vec![SwitchState::Off, SwitchState::Off]);
    }

    #[test]
    fn should_follow_daily_window_on_every_day() {
        let scheduler = Scheduler::new(SwitchState::Off);
        let devices = registry(1);
        let mut schedule = ScheduleStore::new();
        schedule.add_event(daily(0, 8, 0, 60));

        // 2024-01-07 is a Sunday; walk the whole week.
        for day in 7..14 {
            let inside = Utc.with_ymd_and_hms(2024, 1, day, 8, 30, 0).unwrap();
            let before = Utc.with_ymd_and_hms(2024, 1, day, 7, 59, 59).unwrap();
            let after = Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap();
            assert_eq!(
                scheduler.resolve(&devices, &schedule, inside),
                vec![SwitchState::On]
            );
            assert_eq!(
                scheduler.resolve(&devices, &schedule, before),
                vec![SwitchState::Off]
            );
            assert_eq!(
                scheduler.resolve(&devices, &schedule, after),
                vec![SwitchState::Off]
            );
        }
    }

    #[test]
    fn should_carry_saturday_night_window_into_sunday() {
        let scheduler = Scheduler::new(SwitchState::Off);
        let devices = registry(1);
        let mut schedule = ScheduleStore::new();
        // recurrence code 7 = Saturday
        schedule.add_event(RecurringEvent::from_raw(0, 23, 30, 90, 7).unwrap());

        let sunday_early = Utc.with_ymd_and_hms(2024, 1, 7, 0, 15, 0).unwrap();
        let sunday_later = Utc.with_ymd_and_hms(2024, 1, 7, 1, 15, 0).unwrap();
        assert_eq!(
            scheduler.resolve(&devices, &schedule, sunday_early),
            vec![SwitchState::On]
        );
        assert_eq!(
            scheduler.resolve(&devices, &schedule, sunday_later),
            vec![SwitchState::Off]
        );
    }

    #[test]
    fn should_let_override_outrank_recurring_event() {
        let now = wednesday(8, 30);
        let scheduler = Scheduler::new(SwitchState::Off);
        let devices = registry(1);

        // Override inserted before the event: list order must not matter.
        let mut schedule = ScheduleStore::new();
        schedule.add_override(override_at(now, 0, 10, SwitchState::Off));
        schedule.add_event(daily(0, 8, 0, 60));

        assert_eq!(
            scheduler.resolve(&devices, &schedule, now),
            vec![SwitchState::Off]
        );
    }

    #[test]
    fn should_let_later_entry_win_between_broadcast_and_single() {
        let now = wednesday(8, 30);
        let scheduler = Scheduler::new(SwitchState::Off);
        let devices = registry(3);

        let mut schedule = ScheduleStore::new();
        schedule.add_override(override_at(now, 1, 10, SwitchState::On));
        schedule.add_override(override_at(now, -1, 10, SwitchState::Off));
        assert_eq!(
            scheduler.resolve(&devices, &schedule, now),
            vec![SwitchState::Off; 3]
        );

        let mut schedule = ScheduleStore::new();
        schedule.add_override(override_at(now, -1, 10, SwitchState::Off));
        schedule.add_override(override_at(now, 1, 10, SwitchState::On));
        assert_eq!(
            scheduler.resolve(&devices, &schedule, now),
            vec![SwitchState::Off, SwitchState::On, SwitchState::Off]
        );
    }

    #[test]
    fn should_broadcast_recurring_event_to_all_devices() {
        let scheduler = Scheduler::new(SwitchState::Off);
        let mut schedule = ScheduleStore::new();
        schedule.add_event(daily(-1, 8, 0, 60));
        assert_eq!(
            scheduler.resolve(&registry(3), &schedule, wednesday(8, 15)),
            vec![SwitchState::On; 3]
        );
    }

    #[test]
    fn should_ignore_inactive_override() {
        let now = wednesday(8, 30);
        let scheduler = Scheduler::new(SwitchState::Off);
        let mut schedule = ScheduleStore::new();
        schedule.add_override(override_at(now - Duration::minutes(20), 0, 10, SwitchState::On));
        assert_eq!(
            scheduler.resolve(&registry(1), &schedule, now),
            vec![SwitchState::Off]
        );
    }

    #[test]
    fn should_ignore_target_outside_registry() {
        let scheduler = Scheduler::new(SwitchState::Off);
        let mut schedule = ScheduleStore::new();
        schedule.add_event(daily(9, 8, 0, 60));
        assert_eq!(
            scheduler.resolve(&registry(2), &schedule, wednesday(8, 30)),
            vec![SwitchState::Off; 2]
        );
    }

    #[test]
    fn should_report_nothing_on_second_tick_at_same_instant() {
        let now = wednesday(8, 30);
        let mut scheduler = Scheduler::new(SwitchState::Off);
        let mut devices = registry(3);
        let mut schedule = ScheduleStore::new();
        schedule.add_event(daily(2, 8, 0, 60));

        let first = scheduler.tick(&mut devices, &schedule, now);
        assert_eq!(first.len(), 3);
        let second = scheduler.tick(&mut devices, &schedule, now);
        assert!(second.is_empty());
    }

    #[test]
    fn should_report_changes_only_at_transitions() {
        let mut scheduler = Scheduler::new(SwitchState::Off);
        let mut devices = registry(3);
        let mut schedule = ScheduleStore::new();
        schedule.add_event(daily(2, 8, 0, 60));

        // Settle every device from Unknown.
        scheduler.tick(&mut devices, &schedule, wednesday(7, 58));

        let device_two = DeviceId::new(2);
        assert!(
            scheduler
                .tick(&mut devices, &schedule, wednesday(7, 59))
                .is_empty()
        );
        assert_eq!(
            scheduler.tick(&mut devices, &schedule, wednesday(8, 30)),
            vec![device_two]
        );
        assert_eq!(
            devices.get(device_two).map(|dev| dev.status),
            Some(SwitchState::On)
        );
        assert!(
            scheduler
                .tick(&mut devices, &schedule, wednesday(8, 45))
                .is_empty()
        );
        assert_eq!(
            scheduler.tick(&mut devices, &schedule, wednesday(9, 1)),
            vec![device_two]
        );
        assert_eq!(
            devices.get(device_two).map(|dev| dev.status),
            Some(SwitchState::Off)
        );
        assert!(
            scheduler
                .tick(&mut devices, &schedule, wednesday(9, 30))
                .is_empty()
        );
    }

    #[test]
    fn should_return_changed_ids_in_ascending_order() {
        let mut scheduler = Scheduler::new(SwitchState::On);
        let mut devices = registry(4);
        let changed = scheduler.tick(&mut devices, &ScheduleStore::new(), wednesday(0, 0));
        let indices: Vec<_> = changed.iter().map(|id| id.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn should_clear_push_latch_after_first_tick() {
        let mut scheduler = Scheduler::new(SwitchState::Off);
        let mut devices = registry(1);
        assert!(scheduler.needs_push());

        scheduler.tick(&mut devices, &ScheduleStore::new(), wednesday(0, 0));
        assert!(!scheduler.needs_push());

        scheduler.request_full_push();
        assert!(scheduler.needs_push());
        let changed = scheduler.tick(&mut devices, &ScheduleStore::new(), wednesday(0, 0));
        assert!(changed.is_empty());
        assert!(!scheduler.needs_push());
    }
}
