use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::api::error;
use crate::constants::Env;
use crate::modules::video::{
    model::{CreateVideoModel, InsertVideo, UpdateMetadataModel, UpdateVideo, VideoFilter},
    repository::{VideoRepository, ViewIncrement},
    schema::{VideoEntity, VideoStatus},
};

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Upper bound for every individual storage call.
    pub operation_timeout: Duration,
    /// Extra attempts after a version conflict before giving up.
    pub max_retries: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { operation_timeout: Duration::from_secs(5), max_retries: 5 }
    }
}

impl From<&Env> for StoreConfig {
    fn from(env: &Env) -> Self {
        Self {
            operation_timeout: Duration::from_millis(env.operation_timeout_ms),
            max_retries: env.max_retries,
        }
    }
}

/// The video record store. Validates every write against the record
/// invariants and the status state machine before touching storage.
#[derive(Clone)]
pub struct VideoService {
    repo: Arc<dyn VideoRepository + Send + Sync>,
    config: StoreConfig,
}

impl VideoService {
    pub fn with_dependencies(
        repo: Arc<dyn VideoRepository + Send + Sync>,
        config: StoreConfig,
    ) -> Self {
        info!("VideoService initialized with dependencies");
        VideoService { repo, config }
    }

    /// Same store, different bound on storage calls.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut config = self.config.clone();
        config.operation_timeout = timeout;
        VideoService { repo: self.repo.clone(), config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, error::StoreError>
    where
        F: Future<Output = Result<T, error::StorageError>>,
    {
        match tokio::time::timeout(self.config.operation_timeout, op).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                log::error!("Storage call exceeded {:?}", self.config.operation_timeout);
                Err(error::StorageError::Timeout(self.config.operation_timeout).into())
            }
        }
    }

    pub async fn create(&self, video: CreateVideoModel) -> Result<VideoEntity, error::StoreError> {
        video.ensure_valid()?;

        let new_video = InsertVideo::from(video);
        let entity = self.bounded(self.repo.create(&new_video)).await?;
        info!("Video {} created by {}", entity.id, entity.uploaded_by);
        Ok(entity)
    }

    /// Raw-payload variant of [`create`](Self::create).
    pub async fn create_json(
        &self,
        video: serde_json::Value,
    ) -> Result<VideoEntity, error::StoreError> {
        let video = CreateVideoModel::from_json(video)?;
        self.create(video).await
    }

    pub async fn get(&self, id: Uuid) -> Result<VideoEntity, error::StoreError> {
        self.bounded(self.repo.find_by_id(&id))
            .await?
            .ok_or_else(|| error::StoreError::not_found("Video not found"))
    }

    /// Moves the video through the state machine. Each attempt reads the
    /// current version, checks the transition and writes with a
    /// compare-and-set; a lost race re-reads and checks again.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: VideoStatus,
    ) -> Result<VideoEntity, error::StoreError> {
        for attempt in 0..=self.config.max_retries {
            let current = self.get(id).await?;
            current.status.transition(status)?;

            let updated =
                self.bounded(self.repo.update_status(&id, current.version, status)).await?;
            if let Some(video) = updated {
                info!("Video {} status {} -> {}", id, current.status, video.status);
                return Ok(video);
            }
            warn!("Version conflict on video {} (attempt {}), retrying", id, attempt + 1);
        }

        Err(error::StorageError::Conflict(id).into())
    }

    pub async fn complete(&self, id: Uuid) -> Result<VideoEntity, error::StoreError> {
        self.update_status(id, VideoStatus::Completed).await
    }

    pub async fn fail(&self, id: Uuid) -> Result<VideoEntity, error::StoreError> {
        self.update_status(id, VideoStatus::Failed).await
    }

    pub async fn increment_views(
        &self,
        id: Uuid,
        delta: i64,
    ) -> Result<VideoEntity, error::StoreError> {
        if delta < 0 {
            return Err(error::StoreError::validation("View increment cannot be negative"));
        }

        match self.bounded(self.repo.increment_views(&id, delta)).await? {
            ViewIncrement::Applied(video) => Ok(video),
            ViewIncrement::Missing => Err(error::StoreError::not_found("Video not found")),
            ViewIncrement::Overflow => {
                Err(error::StoreError::validation("View counter would overflow"))
            }
        }
    }

    pub async fn update_metadata(
        &self,
        id: Uuid,
        patch: UpdateMetadataModel,
    ) -> Result<VideoEntity, error::StoreError> {
        patch.ensure_valid()?;

        let update = UpdateVideo::from(patch);
        self.bounded(self.repo.update_metadata(&id, &update))
            .await?
            .ok_or_else(|| error::StoreError::not_found("Video not found"))
    }

    /// Raw-payload variant of [`update_metadata`](Self::update_metadata) for
    /// callers that forward client JSON.
    pub async fn update_metadata_json(
        &self,
        id: Uuid,
        patch: serde_json::Value,
    ) -> Result<VideoEntity, error::StoreError> {
        let patch = UpdateMetadataModel::from_json(patch)?;
        self.update_metadata(id, patch).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), error::StoreError> {
        let deleted = self.bounded(self.repo.delete(&id)).await?;
        if !deleted {
            return Err(error::StoreError::not_found("Video not found"));
        }
        info!("Video {} deleted", id);
        Ok(())
    }

    pub async fn list(&self, filter: VideoFilter) -> Result<Vec<VideoEntity>, error::StoreError> {
        filter.validate()?;
        self.bounded(self.repo.find_many(&filter)).await
    }
}
