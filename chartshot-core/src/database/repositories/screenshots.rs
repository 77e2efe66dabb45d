use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

use crate::catalog::filter::TagFilter;
use crate::database::ports::ScreenshotRepository;
use crate::Result;
use chartshot_model::{NewScreenshot, Screenshot, ScreenshotId, Tag, TagId};

#[derive(Clone, Debug)]
pub struct PostgresScreenshotRepository {
    pool: PgPool,
}

impl PostgresScreenshotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve the tag sets for a batch of entries with one grouped query.
    async fn load_tag_sets(
        &self,
        screenshot_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Tag>>> {
        if screenshot_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, TagLinkRow>(
            r#"
            SELECT st.screenshot_id, t.id, t.name
            FROM screenshot_tags st
            JOIN tags t ON t.id = st.tag_id
            WHERE st.screenshot_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(screenshot_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        let mut by_screenshot: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in rows {
            by_screenshot.entry(row.screenshot_id).or_default().push(Tag {
                id: TagId(row.id),
                name: row.name,
            });
        }

        Ok(by_screenshot)
    }
}

#[derive(sqlx::FromRow)]
struct ScreenshotRow {
    id: Uuid,
    title: Option<String>,
    file_path: String,
    created_at: DateTime<Utc>,
}

impl ScreenshotRow {
    fn into_screenshot(self, tags: Vec<Tag>) -> Screenshot {
        Screenshot {
            id: ScreenshotId(self.id),
            title: self.title,
            file_path: self.file_path,
            created_at: self.created_at,
            tags,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TagLinkRow {
    screenshot_id: Uuid,
    id: Uuid,
    name: String,
}

#[async_trait]
impl ScreenshotRepository for PostgresScreenshotRepository {
    async fn create(&self, screenshot: NewScreenshot) -> Result<Screenshot> {
        let row = sqlx::query_as::<_, ScreenshotRow>(
            r#"
            INSERT INTO screenshots (id, title, file_path)
            VALUES ($1, $2, $3)
            RETURNING id, title, file_path, created_at
            "#,
        )
        .bind(ScreenshotId::new().to_uuid())
        .bind(screenshot.title)
        .bind(screenshot.file_path)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_screenshot(Vec::new()))
    }

    async fn exists_by_path(&self, file_path: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM screenshots WHERE file_path = $1)",
        )
        .bind(file_path)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn sync_tags(&self, id: ScreenshotId, tag_ids: &[TagId]) -> Result<()> {
        // Replace-all inside one transaction: no reader ever observes the
        // entry with a partially written tag set.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM screenshot_tags WHERE screenshot_id = $1")
            .bind(id.to_uuid())
            .execute(&mut *tx)
            .await?;

        if !tag_ids.is_empty() {
            let uuids: Vec<Uuid> =
                tag_ids.iter().map(|tag_id| tag_id.to_uuid()).collect();

            sqlx::query(
                r#"
                INSERT INTO screenshot_tags (screenshot_id, tag_id)
                SELECT $1, UNNEST($2::uuid[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id.to_uuid())
            .bind(&uuids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: ScreenshotId) -> Result<Option<Screenshot>> {
        let row = sqlx::query_as::<_, ScreenshotRow>(
            r#"
            SELECT id, title, file_path, created_at
            FROM screenshots
            WHERE id = $1
            "#,
        )
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut tag_sets = self.load_tag_sets(&[row.id]).await?;
        let tags = tag_sets.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_screenshot(tags)))
    }

    async fn list(&self, filter: &TagFilter) -> Result<Vec<Screenshot>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT s.id, s.title, s.file_path, s.created_at
            FROM screenshots s
            WHERE 1=1
            "#,
        );

        for name in &filter.required {
            qb.push(
                " AND EXISTS (SELECT 1 FROM screenshot_tags st \
                 JOIN tags t ON t.id = st.tag_id \
                 WHERE st.screenshot_id = s.id AND t.name = ",
            );
            qb.push_bind(name.clone());
            qb.push(")");
        }

        for name in &filter.excluded {
            qb.push(
                " AND NOT EXISTS (SELECT 1 FROM screenshot_tags st \
                 JOIN tags t ON t.id = st.tag_id \
                 WHERE st.screenshot_id = s.id AND t.name = ",
            );
            qb.push_bind(name.clone());
            qb.push(")");
        }

        let rows = qb
            .build_query_as::<ScreenshotRow>()
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut tag_sets = self.load_tag_sets(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = tag_sets.remove(&row.id).unwrap_or_default();
                row.into_screenshot(tags)
            })
            .collect())
    }
}
