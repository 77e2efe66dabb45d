use async_trait::async_trait;

use crate::catalog::filter::TagFilter;
use crate::Result;
use chartshot_model::{NewScreenshot, Screenshot, ScreenshotId, TagId};

/// The catalog store: persistent screenshot entries and their tag links.
///
/// `file_path` uniqueness is enforced by the store; callers probing for
/// idempotency use [`exists_by_path`](ScreenshotRepository::exists_by_path)
/// before creating.
#[async_trait]
pub trait ScreenshotRepository: Send + Sync {
    async fn create(&self, screenshot: NewScreenshot) -> Result<Screenshot>;

    async fn exists_by_path(&self, file_path: &str) -> Result<bool>;

    /// Replace-all tag sync: after this call the entry's tag set is exactly
    /// `tag_ids`, performed as one transactional unit.
    async fn sync_tags(&self, id: ScreenshotId, tag_ids: &[TagId]) -> Result<()>;

    /// Fetch one entry with its resolved tag set.
    async fn get(&self, id: ScreenshotId) -> Result<Option<Screenshot>>;

    /// List entries matching the filter, each with its resolved tag set.
    /// Ordering is implementation-defined.
    async fn list(&self, filter: &TagFilter) -> Result<Vec<Screenshot>>;
}
