//! Schedule storage port — loading and saving the schedule.

use std::future::Future;

use homeauto_domain::error::HomeAutoError;
use homeauto_domain::schedule::ScheduleStore;

/// Persistent home of the [`ScheduleStore`].
pub trait ScheduleStorage {
    /// Load the persisted schedule. A schedule that was never saved loads as
    /// an empty store.
    fn load(&self) -> impl Future<Output = Result<ScheduleStore, HomeAutoError>> + Send;

    /// Replace the persisted schedule with `schedule`.
    fn save(
        &self,
        schedule: ScheduleStore,
    ) -> impl Future<Output = Result<(), HomeAutoError>> + Send;
}

impl<T: ScheduleStorage + Send + Sync> ScheduleStorage for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<ScheduleStore, HomeAutoError>> + Send {
        (**self).load()
    }

    fn save(
        &self,
        schedule: ScheduleStore,
    ) -> impl Future<Output = Result<(), HomeAutoError>> + Send {
        (**self).save(schedule)
    }
}
