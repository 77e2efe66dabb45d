use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Strongly typed ID for screenshot records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ScreenshotId(pub Uuid);

impl Default for ScreenshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenshotId {
    pub fn new() -> Self {
        ScreenshotId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for ScreenshotId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ScreenshotId {
    fn from(value: Uuid) -> Self {
        ScreenshotId(value)
    }
}

impl std::fmt::Display for ScreenshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed ID for tags.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TagId(pub Uuid);

impl Default for TagId {
    fn default() -> Self {
        Self::new()
    }
}

impl TagId {
    pub fn new() -> Self {
        TagId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for TagId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for TagId {
    fn from(value: Uuid) -> Self {
        TagId(value)
    }
}

impl std::fmt::Display for TagId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
