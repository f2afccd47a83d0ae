pub mod api;
pub mod configs;
pub mod constants;
pub mod modules;
pub mod utils;

#[cfg(test)]
mod test;

pub use api::error::{StorageError, StoreError};
pub use modules::video::{
    model::{CreateVideoModel, UpdateMetadataModel, VideoFilter},
    repository::VideoRepository,
    repository_memory::VideoMemoryRepository,
    repository_pg::VideoPgRepository,
    schema::{Sensitivity, VideoEntity, VideoStatus},
    service::{StoreConfig, VideoService},
};
