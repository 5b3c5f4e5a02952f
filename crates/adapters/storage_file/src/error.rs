//! Storage-specific error type wrapping filesystem errors.

use homeauto_domain::error::HomeAutoError;

/// Errors originating from the file storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading the schedule file failed.
    #[error("failed to read schedule file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the schedule file failed.
    #[error("failed to write schedule file {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<StorageError> for HomeAutoError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_into_storage_error() {
        let err = StorageError::Read {
            path: "schedule.cfg".to_string(),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(err.to_string(), "failed to read schedule file schedule.cfg");
        let err: HomeAutoError = err.into();
        assert!(matches!(err, HomeAutoError::Storage(_)));
    }
}
