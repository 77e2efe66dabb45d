//! PostgreSQL access for the catalog.

pub mod ports;
pub mod repositories;

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::error::{CatalogError, Result};
use repositories::{PostgresScreenshotRepository, PostgresTagRepository};

/// Shared handle to the catalog database: the connection pool plus the
/// repositories built on top of it.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    screenshots: PostgresScreenshotRepository,
    tags: PostgresTagRepository,
}

impl std::fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn new(connection_string: &str) -> Result<Self> {
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(8);

        let min_connections = std::env::var("DB_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(2);

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .test_before_acquire(true)
            .connect(connection_string)
            .await
            .map_err(|e| {
                CatalogError::Internal(format!("database connection failed: {e}"))
            })?;

        info!(
            max_connections,
            min_connections, "database pool initialized"
        );

        Ok(Self::from_pool(pool))
    }

    /// Build from an existing pool (mainly for tests).
    pub fn from_pool(pool: PgPool) -> Self {
        let screenshots = PostgresScreenshotRepository::new(pool.clone());
        let tags = PostgresTagRepository::new(pool.clone());

        PostgresDatabase {
            pool,
            screenshots,
            tags,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// The catalog store.
    pub fn screenshots(&self) -> &PostgresScreenshotRepository {
        &self.screenshots
    }

    /// The tag registry.
    pub fn tags(&self) -> &PostgresTagRepository {
        &self.tags
    }

    /// Apply pending migrations. Safe to run on every startup.
    pub async fn initialize_schema(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(CatalogError::from)?;
        Ok(())
    }
}
