use uuid::Uuid;

use crate::{
    api::error,
    modules::video::{
        model::{InsertVideo, UpdateVideo, VideoFilter},
        repository::{VideoRepository, ViewIncrement},
        schema::{VideoEntity, VideoStatus},
    },
};

#[derive(Clone)]
pub struct VideoPgRepository {
    pool: sqlx::PgPool,
}

impl VideoPgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VideoRepository for VideoPgRepository {
    async fn create(&self, video: &InsertVideo) -> Result<VideoEntity, error::StorageError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let entity = sqlx::query_as::<_, VideoEntity>(
            r#"
            INSERT INTO videos (id, title, description, filename, filesize, duration, sensitivity, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.filename)
        .bind(video.filesize)
        .bind(video.duration)
        .bind(video.sensitivity)
        .bind(video.uploaded_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<VideoEntity>, error::StorageError> {
        let video = sqlx::query_as::<_, VideoEntity>("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }

    async fn update_status(
        &self,
        id: &Uuid,
        expected_version: i64,
        status: VideoStatus,
    ) -> Result<Option<VideoEntity>, error::StorageError> {
        let video = sqlx::query_as::<_, VideoEntity>(
            r#"
            UPDATE videos
            SET status = $3, version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(video)
    }

    async fn increment_views(
        &self,
        id: &Uuid,
        delta: i64,
    ) -> Result<ViewIncrement, error::StorageError> {
        let video = sqlx::query_as::<_, VideoEntity>(
            r#"
            UPDATE videos
            SET views = views + $2, updated_at = NOW()
            WHERE id = $1 AND views <= $3::bigint - $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(i64::MAX)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(video) = video {
            return Ok(ViewIncrement::Applied(video));
        }

        // views never decrease, so a row that exists now was already too close to the limit
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(if exists { ViewIncrement::Overflow } else { ViewIncrement::Missing })
    }

    async fn update_metadata(
        &self,
        id: &Uuid,
        video: &UpdateVideo,
    ) -> Result<Option<VideoEntity>, error::StorageError> {
        let video = sqlx::query_as::<_, VideoEntity>(
            r#"
        UPDATE videos
        SET
            description = CASE WHEN $2::boolean THEN $3::text ELSE description END,
            sensitivity = COALESCE($4::video_sensitivity, sensitivity),
            filesize    = COALESCE($5::bigint, filesize),
            duration    = COALESCE($6::double precision, duration),
            version     = version + 1,
            updated_at  = NOW()
        WHERE id = $1
        RETURNING *
        "#,
        )
        .bind(id)
        .bind(video.description.is_some()) // $2: bool - was description provided?
        .bind(video.description.as_ref().and_then(|v| v.as_ref())) // $3: Option<&String>
        .bind(video.sensitivity) // $4
        .bind(video.filesize) // $5
        .bind(video.duration) // $6
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::StorageError> {
        let rows = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn find_many(
        &self,
        filter: &VideoFilter,
    ) -> Result<Vec<VideoEntity>, error::StorageError> {
        let videos = sqlx::query_as::<_, VideoEntity>(
            r#"
            SELECT * FROM videos
            WHERE ($1::uuid IS NULL OR uploaded_by = $1)
            AND ($2::video_status IS NULL OR status = $2)
            AND ($3::video_sensitivity IS NULL OR sensitivity = $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.uploaded_by)
        .bind(filter.status)
        .bind(filter.sensitivity)
        .bind(filter.page_limit())
        .bind(filter.page_offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(videos)
    }
}
