//! Schedule — recurring events plus manual overrides.
//!
//! The [`ScheduleStore`] keeps both lists in insertion order. Order matters
//! between recurring events (the later match wins) but not between the two
//! lists: an active [`Override`] always outranks every [`RecurringEvent`].
//!
//! Index-based operations are lenient: an out-of-range index is a no-op,
//! never an error.

mod overrides;
mod recurring;
pub mod window;

pub use overrides::Override;
pub use recurring::{Recurrence, RecurringEvent, TimeOfDay};

/// Ordered recurring events and overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleStore {
    events: Vec<RecurringEvent>,
    overrides: Vec<Override>,
}

impl ScheduleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_parts(events: Vec<RecurringEvent>, overrides: Vec<Override>) -> Self {
        Self { events, overrides }
    }

    #[must_use]
    pub fn events(&self) -> &[RecurringEvent] {
        &self.events
    }

    #[must_use]
    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }

    pub fn add_event(&mut self, event: RecurringEvent) {
        self.events.push(event);
    }

    /// Replace the event at `index`. Returns `false` when out of range.
    pub fn edit_event(&mut self, index: usize, event: RecurringEvent) -> bool {
        match self.events.get_mut(index) {
            Some(slot) => {
                *slot = event;
                true
            }
            None => false,
        }
    }

    /// Remove the event at `index`, if any.
    pub fn delete_event(&mut self, index: usize) -> Option<RecurringEvent> {
        (index < self.events.len()).then(|| self.events.remove(index))
    }

    pub fn add_override(&mut self, item: Override) {
        self.overrides.push(item);
    }

    /// Remove the override at `index`, if any.
    pub fn delete_override(&mut self, index: usize) -> Option<Override> {
        (index < self.overrides.len()).then(|| self.overrides.remove(index))
    }
}
