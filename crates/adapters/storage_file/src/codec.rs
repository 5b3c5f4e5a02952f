//! Text format of the persisted schedule.
//!
//! One record per line, `key=value`, whitespace around both trimmed:
//!
//! ```text
//! schedevent=hour,minute,durationMinutes,recurrenceCode,deviceId
//! schedoverr=startEpoch,durationMinutes,stateCode,deviceId
//! ```
//!
//! Records with the wrong field count, unparseable numbers, or values the
//! domain rejects are dropped. Unknown keys and lines without `=` are ignored.

use std::fmt::Write as _;

use homeauto_domain::device::{DeviceTarget, SwitchState};
use homeauto_domain::schedule::{Override, RecurringEvent, ScheduleStore};

const EVENT_KEY: &str = "schedevent";
const OVERRIDE_KEY: &str = "schedoverr";

/// Parse a schedule file. Never fails: bad records are skipped.
#[must_use]
pub fn parse(text: &str) -> ScheduleStore {
    let mut store = ScheduleStore::new();

    for (line_no, line) in text.lines().enumerate() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            EVENT_KEY => match parse_event(value.trim()) {
                Some(event) => store.add_event(event),
                None => tracing::debug!(line = line_no + 1, "dropping malformed event record"),
            },
            OVERRIDE_KEY => match parse_override(value.trim()) {
                Some(item) => store.add_override(item),
                None => tracing::debug!(line = line_no + 1, "dropping malformed override record"),
            },
            _ => {}
        }
    }

    store
}

/// Render a schedule in the persisted format, events first.
#[must_use]
pub fn format(store: &ScheduleStore) -> String {
    let mut out = String::new();
    for ev in store.events() {
        let _ = writeln!(
            out,
            "{EVENT_KEY}={},{},{},{},{}",
            ev.start.hour(),
            ev.start.minute(),
            ev.duration_minutes,
            ev.recurrence.code(),
            ev.target.code(),
        );
    }
    for ov in store.overrides() {
        let _ = writeln!(
            out,
            "{OVERRIDE_KEY}={},{},{},{}",
            ov.start_epoch,
            ov.duration_minutes,
            ov.target_state.code(),
            ov.target.code(),
        );
    }
    out
}

fn fields<const N: usize>(value: &str) -> Option<[&str; N]> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    parts.try_into().ok()
}

fn parse_event(value: &str) -> Option<RecurringEvent> {
    let [hour, minute, duration, recurrence, device] = fields::<5>(value)?;
    RecurringEvent::from_raw(
        device.parse().ok()?,
        hour.parse().ok()?,
        minute.parse().ok()?,
        duration.parse().ok()?,
        recurrence.parse().ok()?,
    )
    .ok()
}

fn parse_override(value: &str) -> Option<Override> {
    let [start, duration, state, device] = fields::<4>(value)?;
    let state = SwitchState::from_code(state.parse().ok()?).ok()?;
    let target = DeviceTarget::from_code(device.parse().ok()?).ok()?;
    Override::new(start.parse().ok()?, duration.parse().ok()?, state, target).ok()
}
