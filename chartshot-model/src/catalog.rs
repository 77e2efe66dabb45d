use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ScreenshotId, TagId};

/// A single classification label, derived from a folder name during import or
/// supplied explicitly on upload. Names are unique; tags are never mutated or
/// deleted once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// One cataloged screenshot: a display title, the storage-relative file path
/// (unique, forward-slash separated), and the tag set last synced onto it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    pub id: ScreenshotId,
    pub title: Option<String>,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<Tag>,
}

/// Insert payload for a screenshot record. Tags are associated separately via
/// the replace-all sync operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScreenshot {
    pub title: Option<String>,
    pub file_path: String,
}

impl NewScreenshot {
    pub fn new(title: Option<String>, file_path: impl Into<String>) -> Self {
        Self {
            title,
            file_path: file_path.into(),
        }
    }
}
