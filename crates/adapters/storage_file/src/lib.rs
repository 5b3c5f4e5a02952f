//! # homeauto-adapter-storage-file
//!
//! File persistence adapter for the schedule.
//!
//! ## Responsibilities
//! - Implement the `ScheduleStorage` port defined in `homeauto-app::ports`
//! - Own the persisted `key=value` record format ([`codec`])
//! - Replace the file atomically on save (write to a sibling, then rename)
//!
//! ## Dependency rule
//! Depends on `homeauto-app` (for port traits) and `homeauto-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod codec;
mod error;

pub use error::StorageError;

use std::future::Future;
use std::path::{Path, PathBuf};

use homeauto_app::ports::ScheduleStorage;
use homeauto_domain::error::HomeAutoError;
use homeauto_domain::schedule::ScheduleStore;

/// Schedule storage backed by a single text file.
#[derive(Debug, Clone)]
pub struct FileScheduleStorage {
    path: PathBuf,
}

impl FileScheduleStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<ScheduleStore, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(codec::parse(&text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no schedule file yet, starting empty");
                Ok(ScheduleStore::new())
            }
            Err(source) => Err(StorageError::Read {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }

    async fn write(&self, schedule: &ScheduleStore) -> Result<(), StorageError> {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        let write_err = |source| StorageError::Write {
            path: self.path.display().to_string(),
            source,
        };
        tokio::fs::write(&staging, codec::format(schedule))
            .await
            .map_err(write_err)?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(write_err)
    }
}

impl ScheduleStorage for FileScheduleStorage {
    fn load(&self) -> impl Future<Output = Result<ScheduleStore, HomeAutoError>> + Send {
        async move {
            let store = self.read().await?;
            tracing::info!(
                path = %self.path.display(),
                events = store.events().len(),
                overrides = store.overrides().len(),
                "schedule loaded"
            );
            Ok(store)
        }
    }

    fn save(
        &self,
        schedule: ScheduleStore,
    ) -> impl Future<Output = Result<(), HomeAutoError>> + Send {
        async move {
            self.write(&schedule).await?;
            Ok(())
        }
    }
}
