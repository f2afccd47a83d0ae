use std::sync::Arc;

use video_store::{
    configs::{connect_database, run_migrations},
    constants::Env,
    StoreConfig, VideoFilter, VideoPgRepository, VideoService, VideoStatus,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");

    let env = Env::from_env().map_err(std::io::Error::other)?;

    let db_pool = connect_database(&env)
        .await
        .map_err(|_| std::io::Error::other("Database connection error"))?;
    run_migrations(&db_pool).await.map_err(std::io::Error::other)?;

    let video_service = VideoService::with_dependencies(
        Arc::new(VideoPgRepository::new(db_pool.clone())),
        StoreConfig::from(&env),
    );

    let pending = video_service
        .list(VideoFilter::default().status(VideoStatus::Uploading).page(100, 0))
        .await
        .map_err(std::io::Error::other)?;
    log::info!("Video store ready, {} upload(s) still in progress", pending.len());

    db_pool.close().await;
    Ok(())
}
