//! Durable storage for uploaded screenshots under the public root.

use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::error::Result;

/// Folder under the public root where screenshots live, both imported and
/// uploaded. Doubles as the root marker segment for tag derivation.
pub const SCREENSHOTS_DIR: &str = "screenshots";

#[derive(Debug, Clone)]
pub struct MediaStorage {
    public_root: PathBuf,
}

impl MediaStorage {
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        Self {
            public_root: public_root.into(),
        }
    }

    pub fn public_root(&self) -> &Path {
        &self.public_root
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.public_root.join(SCREENSHOTS_DIR)
    }

    /// Persist an uploaded image under the screenshots folder with a
    /// generated name, returning the stored path relative to the public root
    /// (forward-slash form, ready to persist as `file_path`).
    pub async fn store_screenshot(
        &self,
        bytes: &[u8],
        extension: &str,
    ) -> Result<String> {
        let dir = self.screenshots_dir();
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{extension}", Uuid::new_v4());
        let target = dir.join(&file_name);
        tokio::fs::write(&target, bytes).await?;

        debug!(path = %target.display(), bytes = bytes.len(), "stored upload");

        Ok(format!("{SCREENSHOTS_DIR}/{file_name}"))
    }
}
