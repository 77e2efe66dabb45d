use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::ports::TagRepository;
use crate::Result;
use chartshot_model::{Tag, TagId};

#[derive(Clone, Debug)]
pub struct PostgresTagRepository {
    pool: PgPool,
}

impl PostgresTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TagRow {
    id: Uuid,
    name: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Tag {
            id: TagId(row.id),
            name: row.name,
        }
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn get_or_create(&self, name: &str) -> Result<TagId> {
        // Single atomic statement so two concurrent callers with the same
        // name cannot race an existence check: the no-op DO UPDATE makes the
        // conflicting row visible to RETURNING.
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO tags (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(TagId::new().to_uuid())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(TagId(id))
    }

    async fn list_all(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query_as::<_, TagRow>(
            "SELECT id, name FROM tags ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }
}
