use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

use crate::api::error;

#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "video_sensitivity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl Sensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Low => "low",
            Sensitivity::Medium => "medium",
            Sensitivity::High => "high",
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sensitivity {
    type Err = error::StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Sensitivity::Low),
            "medium" => Ok(Sensitivity::Medium),
            "high" => Ok(Sensitivity::High),
            other => Err(error::StoreError::validation(format!(
                "'{other}' is not a valid sensitivity (expected low, medium or high)"
            ))),
        }
    }
}

/// Lifecycle of an upload. `Uploading` is the only non-terminal state.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "video_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    #[default]
    Uploading,
    Completed,
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploading => "uploading",
            VideoStatus::Completed => "completed",
            VideoStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, VideoStatus::Uploading)
    }

    pub fn can_transition_to(&self, next: VideoStatus) -> bool {
        matches!(
            (self, next),
            (VideoStatus::Uploading, VideoStatus::Completed)
                | (VideoStatus::Uploading, VideoStatus::Failed)
        )
    }

    /// Checks `self -> next` against the state machine and returns `next` when allowed.
    pub fn transition(&self, next: VideoStatus) -> Result<VideoStatus, error::StoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(error::StoreError::invalid_transition(*self, next))
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoStatus {
    type Err = error::StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploading" => Ok(VideoStatus::Uploading),
            "completed" => Ok(VideoStatus::Completed),
            "failed" => Ok(VideoStatus::Failed),
            other => Err(error::StoreError::validation(format!(
                "'{other}' is not a valid status (expected uploading, completed or failed)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntity {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub filename: String,
    pub filesize: Option<i64>,
    pub duration: Option<f64>,
    pub sensitivity: Sensitivity,
    pub status: VideoStatus,
    pub uploaded_by: Uuid,
    pub views: i64,
    pub version: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_uploading_moves_forward() {
        use VideoStatus::*;
        let all = [Uploading, Completed, Failed];
        for from in all {
            for to in all {
                let allowed = from == Uploading && to != Uploading;
                assert_eq!(from.can_transition_to(to), allowed, "{from} -> {to}");
            }
        }
        assert!(Completed.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Uploading.is_terminal());
    }

    #[test]
    fn rejected_transition_reports_states() {
        let err = VideoStatus::Failed.transition(VideoStatus::Completed).unwrap_err();
        assert!(matches!(
            err,
            error::StoreError::InvalidTransition {
                from: VideoStatus::Failed,
                to: VideoStatus::Completed
            }
        ));
    }

    #[test]
    fn enum_values_keep_their_wire_names() {
        assert_eq!(serde_json::to_value(Sensitivity::High).unwrap(), "high");
        assert_eq!(serde_json::to_value(VideoStatus::Completed).unwrap(), "completed");
        assert_eq!("medium".parse::<Sensitivity>().unwrap(), Sensitivity::Medium);
        assert_eq!("failed".parse::<VideoStatus>().unwrap(), VideoStatus::Failed);
        assert!(matches!(
            "extreme".parse::<Sensitivity>(),
            Err(error::StoreError::Validation(_))
        ));
        assert!(matches!("done".parse::<VideoStatus>(), Err(error::StoreError::Validation(_))));
        assert!(serde_json::from_value::<VideoStatus>(serde_json::json!("Completed")).is_err());
    }

    #[test]
    fn entity_serializes_with_camel_case_fields() {
        let now = chrono::Utc::now();
        let entity = VideoEntity {
            id: Uuid::now_v7(),
            title: "Demo".into(),
            description: None,
            filename: "demo.mp4".into(),
            filesize: Some(1024),
            duration: None,
            sensitivity: Sensitivity::default(),
            status: VideoStatus::default(),
            uploaded_by: Uuid::now_v7(),
            views: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["uploadedBy"], serde_json::json!(entity.uploaded_by));
        assert_eq!(json["sensitivity"], "medium");
        assert_eq!(json["status"], "uploading");
        assert!(json.get("createdAt").is_some());
    }
}
