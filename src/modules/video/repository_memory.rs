use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    api::error,
    modules::video::{
        model::{InsertVideo, UpdateVideo, VideoFilter},
        repository::{VideoRepository, ViewIncrement},
        schema::{VideoEntity, VideoStatus},
    },
};

/// In-process backend. Each call holds the write lock for exactly one
/// mutation, which gives the same per-record atomicity as the SQL backend.
#[derive(Clone, Default)]
pub struct VideoMemoryRepository {
    videos: Arc<RwLock<HashMap<Uuid, VideoEntity>>>,
}

impl VideoMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.videos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.videos.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl VideoRepository for VideoMemoryRepository {
    async fn create(&self, video: &InsertVideo) -> Result<VideoEntity, error::StorageError> {
        let now = chrono::Utc::now();
        let entity = VideoEntity {
            id: Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)),
            title: video.title.clone(),
            description: video.description.clone(),
            filename: video.filename.clone(),
            filesize: video.filesize,
            duration: video.duration,
            sensitivity: video.sensitivity,
            status: VideoStatus::Uploading,
            uploaded_by: video.uploaded_by,
            views: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        self.videos.write().await.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<VideoEntity>, error::StorageError> {
        Ok(self.videos.read().await.get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &Uuid,
        expected_version: i64,
        status: VideoStatus,
    ) -> Result<Option<VideoEntity>, error::StorageError> {
        let mut videos = self.videos.write().await;
        let Some(video) = videos.get_mut(id) else {
            return Ok(None);
        };
        if video.version != expected_version {
            return Ok(None);
        }

        video.status = status;
        video.version += 1;
        video.updated_at = chrono::Utc::now();
        Ok(Some(video.clone()))
    }

    async fn increment_views(
        &self,
        id: &Uuid,
        delta: i64,
    ) -> Result<ViewIncrement, error::StorageError> {
        let mut videos = self.videos.write().await;
        let Some(video) = videos.get_mut(id) else {
            return Ok(ViewIncrement::Missing);
        };
        let Some(views) = video.views.checked_add(delta) else {
            return Ok(ViewIncrement::Overflow);
        };

        video.views = views;
        video.updated_at = chrono::Utc::now();
        Ok(ViewIncrement::Applied(video.clone()))
    }

    async fn update_metadata(
        &self,
        id: &Uuid,
        patch: &UpdateVideo,
    ) -> Result<Option<VideoEntity>, error::StorageError> {
        let mut videos = self.videos.write().await;
        let Some(video) = videos.get_mut(id) else {
            return Ok(None);
        };

        if let Some(description) = &patch.description {
            video.description = description.clone();
        }
        if let Some(sensitivity) = patch.sensitivity {
            video.sensitivity = sensitivity;
        }
        if let Some(filesize) = patch.filesize {
            video.filesize = Some(filesize);
        }
        if let Some(duration) = patch.duration {
            video.duration = Some(duration);
        }
        video.version += 1;
        video.updated_at = chrono::Utc::now();
        Ok(Some(video.clone()))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::StorageError> {
        Ok(self.videos.write().await.remove(id).is_some())
    }

    async fn find_many(
        &self,
        filter: &VideoFilter,
    ) -> Result<Vec<VideoEntity>, error::StorageError> {
        let videos = self.videos.read().await;

        let mut matched: Vec<VideoEntity> = videos
            .values()
            .filter(|v| filter.uploaded_by.map_or(true, |u| v.uploaded_by == u))
            .filter(|v| filter.status.map_or(true, |s| v.status == s))
            .filter(|v| filter.sensitivity.map_or(true, |s| v.sensitivity == s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        Ok(matched
            .into_iter()
            .skip(filter.page_offset() as usize)
            .take(filter.page_limit() as usize)
            .collect())
    }
}
