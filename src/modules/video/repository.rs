use uuid::Uuid;

use crate::{
    api::error,
    modules::video::{
        model::{InsertVideo, UpdateVideo, VideoFilter},
        schema::{VideoEntity, VideoStatus},
    },
};

/// Result of an atomic view-counter increment.
#[derive(Debug)]
pub enum ViewIncrement {
    Applied(VideoEntity),
    Missing,
    /// The counter would exceed `i64::MAX`; nothing was written.
    Overflow,
}

/// Storage backend for video records.
///
/// Every method is a single atomic step on one record. Methods that target an
/// id report an absent row (`None`, `false`, `ViewIncrement::Missing`) and
/// leave the not-found decision to the caller.
#[async_trait::async_trait]
pub trait VideoRepository {
    async fn create(&self, video: &InsertVideo) -> Result<VideoEntity, error::StorageError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<VideoEntity>, error::StorageError>;

    /// Compare-and-set on `version`. Returns `None` when the row is missing or
    /// was modified since `expected_version` was read.
    async fn update_status(
        &self,
        id: &Uuid,
        expected_version: i64,
        status: VideoStatus,
    ) -> Result<Option<VideoEntity>, error::StorageError>;

    async fn increment_views(
        &self,
        id: &Uuid,
        delta: i64,
    ) -> Result<ViewIncrement, error::StorageError>;

    async fn update_metadata(
        &self,
        id: &Uuid,
        video: &UpdateVideo,
    ) -> Result<Option<VideoEntity>, error::StorageError>;

    async fn delete(&self, id: &Uuid) -> Result<bool, error::StorageError>;

    /// Newest first, paged by the filter's limit and offset.
    async fn find_many(&self, filter: &VideoFilter)
        -> Result<Vec<VideoEntity>, error::StorageError>;
}
