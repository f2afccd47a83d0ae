use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::error,
    modules::video::schema::{Sensitivity, VideoStatus},
    utils::{double_option, validated_json},
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Fields owned by the store or by other operations. A metadata patch naming
/// any of them is rejected outright.
const IMMUTABLE_FIELDS: &[&str] =
    &["id", "uploadedBy", "status", "views", "version", "createdAt", "updatedAt"];

/// Fields the store assigns itself when a video is created.
const GENERATED_FIELDS: &[&str] = &["id", "views", "version", "createdAt", "updatedAt"];

fn reject_fields(
    value: &serde_json::Value,
    fields: &[&str],
    operation: &str,
) -> Result<(), error::StoreError> {
    let Some(object) = value.as_object() else {
        return Ok(());
    };
    match fields.iter().find(|f| object.contains_key(**f)) {
        Some(field) => Err(error::StoreError::validation(format!(
            "'{field}' cannot be set through {operation}"
        ))),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateVideoModel {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Filename cannot be empty"))]
    pub filename: String,
    #[validate(range(min = 0, message = "Filesize cannot be negative"))]
    pub filesize: Option<i64>,
    #[validate(range(min = 0.0, message = "Duration cannot be negative"))]
    pub duration: Option<f64>,
    pub sensitivity: Option<Sensitivity>,
    /// Accepted for compatibility with upload clients; must be `uploading` when present.
    pub status: Option<VideoStatus>,
    pub uploaded_by: Uuid,
}

impl CreateVideoModel {
    pub fn new(title: impl Into<String>, filename: impl Into<String>, uploaded_by: Uuid) -> Self {
        Self {
            title: title.into(),
            description: None,
            filename: filename.into(),
            filesize: None,
            duration: None,
            sensitivity: None,
            status: None,
            uploaded_by,
        }
    }

    /// Parses a raw create payload. Store-assigned fields are named in the
    /// error; any other unknown field fails deserialization.
    pub fn from_json(value: serde_json::Value) -> Result<Self, error::StoreError> {
        reject_fields(&value, GENERATED_FIELDS, "a create request")?;
        validated_json(value)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_filesize(mut self, filesize: i64) -> Self {
        self.filesize = Some(filesize);
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = Some(sensitivity);
        self
    }

    pub fn ensure_valid(&self) -> Result<(), error::StoreError> {
        self.validate()?;

        if self.title.trim().is_empty() {
            return Err(error::StoreError::validation("Title cannot be empty"));
        }
        if self.filename.trim().is_empty() {
            return Err(error::StoreError::validation("Filename cannot be empty"));
        }
        if self.uploaded_by.is_nil() {
            return Err(error::StoreError::validation("uploadedBy is required"));
        }
        ensure_finite(self.duration)?;

        match self.status {
            None | Some(VideoStatus::Uploading) => Ok(()),
            Some(other) => Err(error::StoreError::validation(format!(
                "New videos start in 'uploading', got '{other}'"
            ))),
        }
    }
}

/// Partial update of the mutable metadata of a video.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateMetadataModel {
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub sensitivity: Option<Sensitivity>,
    #[validate(range(min = 0, message = "Filesize cannot be negative"))]
    pub filesize: Option<i64>,
    #[validate(range(min = 0.0, message = "Duration cannot be negative"))]
    pub duration: Option<f64>,
}

impl UpdateMetadataModel {
    /// Parses a raw patch, naming the offending field when it targets
    /// identity, ownership, status or counters.
    pub fn from_json(value: serde_json::Value) -> Result<Self, error::StoreError> {
        reject_fields(&value, IMMUTABLE_FIELDS, "a metadata update")?;
        validated_json(value)
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.sensitivity.is_none()
            && self.filesize.is_none()
            && self.duration.is_none()
    }

    pub fn ensure_valid(&self) -> Result<(), error::StoreError> {
        if self.is_empty() {
            return Err(error::StoreError::validation("No fields to update"));
        }
        self.validate()?;
        ensure_finite(self.duration)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VideoFilter {
    pub uploaded_by: Option<Uuid>,
    pub status: Option<VideoStatus>,
    pub sensitivity: Option<Sensitivity>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
    #[validate(range(min = 0, message = "Offset cannot be negative"))]
    pub offset: Option<i64>,
}

impl VideoFilter {
    pub fn uploaded_by(mut self, user_id: Uuid) -> Self {
        self.uploaded_by = Some(user_id);
        self
    }

    pub fn status(mut self, status: VideoStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = Some(sensitivity);
        self
    }

    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    pub fn page_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn page_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

pub struct InsertVideo {
    pub title: String,
    pub description: Option<String>,
    pub filename: String,
    pub filesize: Option<i64>,
    pub duration: Option<f64>,
    pub sensitivity: Sensitivity,
    pub uploaded_by: Uuid,
}

impl From<CreateVideoModel> for InsertVideo {
    fn from(model: CreateVideoModel) -> Self {
        InsertVideo {
            title: model.title,
            description: model.description,
            filename: model.filename,
            filesize: model.filesize,
            duration: model.duration,
            sensitivity: model.sensitivity.unwrap_or_default(),
            uploaded_by: model.uploaded_by,
        }
    }
}

pub struct UpdateVideo {
    pub description: Option<Option<String>>,
    pub sensitivity: Option<Sensitivity>,
    pub filesize: Option<i64>,
    pub duration: Option<f64>,
}

impl From<UpdateMetadataModel> for UpdateVideo {
    fn from(model: UpdateMetadataModel) -> Self {
        UpdateVideo {
            description: model.description,
            sensitivity: model.sensitivity,
            filesize: model.filesize,
            duration: model.duration,
        }
    }
}

fn ensure_finite(duration: Option<f64>) -> Result<(), error::StoreError> {
    match duration {
        Some(d) if !d.is_finite() => {
            Err(error::StoreError::validation("Duration must be a finite number"))
        }
        _ => Ok(()),
    }
}
