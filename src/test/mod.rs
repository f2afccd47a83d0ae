//! PostgreSQL-backed checks for `VideoPgRepository`. They need a reachable
//! `DATABASE_URL`; run with `cargo test -- --ignored`.

use std::sync::Arc;

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    api::error,
    modules::video::{
        model::{CreateVideoModel, VideoFilter},
        repository_pg::VideoPgRepository,
        schema::{Sensitivity, VideoStatus},
        service::{StoreConfig, VideoService},
    },
};

fn service(pool: PgPool) -> VideoService {
    VideoService::with_dependencies(Arc::new(VideoPgRepository::new(pool)), StoreConfig::default())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pg_lifecycle_round_trip(pool: PgPool) {
    let svc = service(pool.clone());
    let owner = Uuid::now_v7();

    let video = svc.create(CreateVideoModel::new("Demo", "demo.mp4", owner)).await.unwrap();
    assert_eq!(video.status, VideoStatus::Uploading);
    assert_eq!(video.sensitivity, Sensitivity::Medium);
    assert_eq!(video.views, 0);

    let raw: (String, String) =
        sqlx::query_as("SELECT status::text, sensitivity::text FROM videos WHERE id = $1")
            .bind(video.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(raw, ("uploading".to_string(), "medium".to_string()));

    let completed = svc.complete(video.id).await.unwrap();
    assert_eq!(completed.status, VideoStatus::Completed);
    assert_eq!(completed.version, video.version + 1);

    let err = svc.fail(video.id).await.unwrap_err();
    assert!(matches!(err, error::StoreError::InvalidTransition { .. }));
    assert_eq!(svc.get(video.id).await.unwrap().status, VideoStatus::Completed);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pg_concurrent_transitions_pick_one_winner(pool: PgPool) {
    let svc = service(pool);
    let video = svc.create(CreateVideoModel::new("Demo", "demo.mp4", Uuid::now_v7())).await.unwrap();
    let id = video.id;

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let svc = svc.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    svc.complete(id).await
                } else {
                    svc.fail(id).await
                }
            })
        })
        .collect();

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(v) => winners.push(v.status),
            Err(error::StoreError::InvalidTransition { from, .. }) => assert!(from.is_terminal()),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners.len(), 1);
    let stored = svc.get(id).await.unwrap();
    assert_eq!(stored.status, winners[0]);
    assert_eq!(stored.version, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pg_view_counter_overflow_is_rejected(pool: PgPool) {
    let svc = service(pool);
    let video = svc.create(CreateVideoModel::new("Demo", "demo.mp4", Uuid::now_v7())).await.unwrap();

    assert_eq!(svc.increment_views(video.id, i64::MAX).await.unwrap().views, i64::MAX);
    let err = svc.increment_views(video.id, 1).await.unwrap_err();
    assert!(matches!(err, error::StoreError::Validation(_)));
    assert!(!err.is_retryable());
    assert_eq!(svc.get(video.id).await.unwrap().views, i64::MAX);

    let missing = svc.increment_views(Uuid::now_v7(), 1).await;
    assert!(matches!(missing, Err(error::StoreError::NotFound(_))));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pg_concurrent_increments(pool: PgPool) {
    let svc = service(pool);
    let video = svc.create(CreateVideoModel::new("Demo", "demo.mp4", Uuid::now_v7())).await.unwrap();
    let id = video.id;

    let handles: Vec<_> = (0..25)
        .map(|_| {
            let svc = svc.clone();
            tokio::spawn(async move { svc.increment_views(id, 2).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(svc.get(id).await.unwrap().views, 50);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pg_metadata_patch_and_delete(pool: PgPool) {
    let svc = service(pool);
    let owner = Uuid::now_v7();
    let video = svc
        .create(CreateVideoModel::new("Demo", "demo.mp4", owner).with_description("draft"))
        .await
        .unwrap();

    let patched = svc
        .update_metadata_json(video.id, json!({ "description": null, "filesize": 2048 }))
        .await
        .unwrap();
    assert_eq!(patched.description, None);
    assert_eq!(patched.filesize, Some(2048));
    assert_eq!(patched.uploaded_by, owner);

    let err = svc.update_metadata_json(video.id, json!({ "uploadedBy": Uuid::now_v7() })).await;
    assert!(matches!(err, Err(error::StoreError::Validation(_))));

    let listed = svc.list(VideoFilter::default().uploaded_by(owner)).await.unwrap();
    assert_eq!(listed.len(), 1);

    svc.delete(video.id).await.unwrap();
    assert!(matches!(svc.get(video.id).await, Err(error::StoreError::NotFound(_))));
    assert!(matches!(svc.delete(video.id).await, Err(error::StoreError::NotFound(_))));
}
