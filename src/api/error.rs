use std::borrow::Cow;
use std::time::Duration;

use crate::modules::video::schema::VideoStatus;

/// Errors returned by every store operation.
///
/// `Validation`, `NotFound` and `InvalidTransition` describe caller misuse and
/// are never retried. `Storage` wraps backend faults and is safe to retry with
/// backoff, since no partial write is ever persisted.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Validation Error: {0}")]
    Validation(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Invalid Transition: {from} -> {to}")]
    InvalidTransition { from: VideoStatus, to: VideoStatus },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Database Error: {0}")]
    Database(Cow<'static, str>),
    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Concurrent modification of {0}, retries exhausted")]
    Conflict(uuid::Uuid),
    #[error("Internal Storage Error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn validation(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_transition(from: VideoStatus, to: VideoStatus) -> Self {
        Self::InvalidTransition { from, to }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Storage(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        log::error!("{:?}", err);
        if let sqlx::Error::Database(db_err) = &err {
            log::error!("Unhandled DB error: {:?}", db_err);
            return StorageError::Database(db_err.message().to_string().into());
        }
        StorageError::Internal(Box::new(err))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Storage(err.into())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        log::error!("Migration failed: {:?}", err);
        StoreError::Storage(StorageError::Internal(Box::new(err)))
    }
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(errs: validator::ValidationErrors) -> Self {
        StoreError::Validation(errs.to_string().into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Validation(err.to_string().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_errors_are_retryable() {
        assert!(!StoreError::validation("title is required").is_retryable());
        assert!(!StoreError::not_found("Video not found").is_retryable());
        assert!(!StoreError::invalid_transition(VideoStatus::Completed, VideoStatus::Failed)
            .is_retryable());
        assert!(StoreError::from(StorageError::Timeout(Duration::from_millis(10))).is_retryable());
        assert!(StoreError::from(StorageError::Conflict(uuid::Uuid::nil())).is_retryable());
    }

    #[test]
    fn transition_error_names_both_states() {
        let err = StoreError::invalid_transition(VideoStatus::Completed, VideoStatus::Failed);
        assert_eq!(err.to_string(), "Invalid Transition: completed -> failed");
    }
}
