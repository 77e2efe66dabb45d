use async_trait::async_trait;

use crate::Result;
use chartshot_model::{Tag, TagId};

/// The tag registry: get-or-create by unique name, plus enumeration for the
/// tags endpoint. Tags are never updated or deleted.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Idempotent upsert keyed on the unique name. Repeated calls with the
    /// same name always return the same identifier.
    async fn get_or_create(&self, name: &str) -> Result<TagId>;

    async fn list_all(&self) -> Result<Vec<Tag>>;
}
