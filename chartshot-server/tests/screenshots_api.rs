//! End-to-end API tests against a real PostgreSQL instance.
//!
//! Set `TEST_DATABASE_URL` to run these; without it each test prints a skip
//! notice and passes.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use sqlx::postgres::PgPoolOptions;
use tempfile::TempDir;

use chartshot_core::database::ports::{ScreenshotRepository, TagRepository};
use chartshot_core::{MediaStorage, PostgresDatabase};
use chartshot_model::{NewScreenshot, Screenshot, Tag};
use chartshot_server::infra::config::{
    Config, CorsConfig, DatabaseConfig, ServerConfig, StorageConfig,
};
use chartshot_server::{create_app, AppState};

// Tests share one database and reset it on setup; serialize them.
static DB_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn tiny_png() -> Vec<u8> {
    let mut bytes = PNG_MAGIC.to_vec();
    bytes.extend_from_slice(&[0u8; 24]);
    bytes
}

struct TestContext {
    server: TestServer,
    db: Arc<PostgresDatabase>,
    // Held so the storage directory outlives the test.
    _storage_dir: TempDir,
}

async fn setup() -> Option<TestContext> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping API test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to test database");

    sqlx::migrate!("../chartshot-core/migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    sqlx::query("TRUNCATE screenshots, tags CASCADE")
        .execute(&pool)
        .await
        .expect("failed to reset tables");

    let storage_dir = tempfile::tempdir().expect("failed to create temp storage");

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
        },
        database: DatabaseConfig { url },
        storage: StorageConfig {
            public_root: storage_dir.path().to_path_buf(),
        },
        cors: CorsConfig {
            allowed_origins: vec!["*".to_owned()],
        },
    };

    let db = Arc::new(PostgresDatabase::from_pool(pool));
    let state = AppState {
        db: db.clone(),
        storage: Arc::new(MediaStorage::new(storage_dir.path())),
        config: Arc::new(config),
    };

    let server = TestServer::new(create_app(state)).expect("failed to start test server");

    Some(TestContext {
        server,
        db,
        _storage_dir: storage_dir,
    })
}

/// Create an entry directly through the repositories, tagged with `names`.
async fn seed_screenshot(db: &PostgresDatabase, path: &str, names: &[&str]) {
    let created = db
        .screenshots()
        .create(NewScreenshot::new(None, path))
        .await
        .expect("failed to seed screenshot");

    let mut tag_ids = Vec::new();
    for name in names {
        tag_ids.push(db.tags().get_or_create(name).await.expect("get_or_create"));
    }
    db.screenshots()
        .sync_tags(created.id, &tag_ids)
        .await
        .expect("sync_tags");
}

fn paths(screenshots: &[Screenshot]) -> Vec<&str> {
    let mut out: Vec<&str> = screenshots.iter().map(|s| s.file_path.as_str()).collect();
    out.sort_unstable();
    out
}

#[tokio::test]
async fn listing_applies_hide_rule_and_and_semantics() {
    let _guard = DB_LOCK.lock().await;
    let Some(ctx) = setup().await else { return };

    seed_screenshot(&ctx.db, "screenshots/a.png", &["Jan"]).await;
    seed_screenshot(&ctx.db, "screenshots/b.png", &["Jan", "draw"]).await;
    seed_screenshot(&ctx.db, "screenshots/c.png", &["Jan", "Monday"]).await;

    // No filter: draw-tagged entries are hidden by default.
    let response = ctx.server.get("/api/screenshots").await;
    response.assert_status(StatusCode::OK);
    let listed: Vec<Screenshot> = response.json();
    assert_eq!(paths(&listed), vec!["screenshots/a.png", "screenshots/c.png"]);

    // Entries come back with their tag sets resolved.
    let a = listed
        .iter()
        .find(|s| s.file_path == "screenshots/a.png")
        .unwrap();
    assert_eq!(a.tags.len(), 1);
    assert_eq!(a.tags[0].name, "Jan");

    // Requesting draw opts in to seeing drawn-over shots, and only those.
    let response = ctx
        .server
        .get("/api/screenshots")
        .add_query_param("tags", "draw")
        .await;
    response.assert_status(StatusCode::OK);
    let listed: Vec<Screenshot> = response.json();
    assert_eq!(paths(&listed), vec!["screenshots/b.png"]);

    // A filter that does not mention draw still hides it.
    let response = ctx
        .server
        .get("/api/screenshots")
        .add_query_param("tags", "Jan")
        .await;
    let listed: Vec<Screenshot> = response.json();
    assert_eq!(paths(&listed), vec!["screenshots/a.png", "screenshots/c.png"]);

    // Naming draw alongside other tags lifts the exclusion.
    let response = ctx
        .server
        .get("/api/screenshots")
        .add_query_param("tags", "Jan,draw")
        .await;
    let listed: Vec<Screenshot> = response.json();
    assert_eq!(paths(&listed), vec!["screenshots/b.png"]);

    // AND semantics: every requested tag must be present.
    let response = ctx
        .server
        .get("/api/screenshots")
        .add_query_param("tags", "Jan,Monday")
        .await;
    let listed: Vec<Screenshot> = response.json();
    assert_eq!(paths(&listed), vec!["screenshots/c.png"]);

    let response = ctx
        .server
        .get("/api/screenshots")
        .add_query_param("tags", "Jan,Tuesday")
        .await;
    let listed: Vec<Screenshot> = response.json();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn upload_persists_entry_file_and_tags() {
    let _guard = DB_LOCK.lock().await;
    let Some(ctx) = setup().await else { return };

    let form = MultipartForm::new()
        .add_text("title", "Breakout retest")
        .add_text("tags", "Bullish")
        .add_text("tags", "5min")
        .add_part(
            "image",
            Part::bytes(tiny_png())
                .file_name("shot.png")
                .mime_type("image/png"),
        );

    let response = ctx.server.post("/api/screenshots").multipart(form).await;
    response.assert_status(StatusCode::CREATED);

    let created: Screenshot = response.json();
    assert_eq!(created.title.as_deref(), Some("Breakout retest"));
    assert!(created.file_path.starts_with("screenshots/"));
    assert!(created.file_path.ends_with(".png"));

    let mut tag_names: Vec<&str> = created.tags.iter().map(|t| t.name.as_str()).collect();
    tag_names.sort_unstable();
    assert_eq!(tag_names, vec!["5min", "Bullish"]);

    // The payload landed under the public root at the persisted path.
    let stored = ctx._storage_dir.path().join(&created.file_path);
    assert_eq!(std::fs::read(stored).unwrap(), tiny_png());

    // A second upload reusing a tag name maps to the same tag row.
    let form = MultipartForm::new().add_text("tags", "Bullish").add_part(
        "image",
        Part::bytes(tiny_png())
            .file_name("other.png")
            .mime_type("image/png"),
    );
    let response = ctx.server.post("/api/screenshots").multipart(form).await;
    response.assert_status(StatusCode::CREATED);
    let second: Screenshot = response.json();
    assert!(second.title.is_none());

    let response = ctx.server.get("/api/tags").await;
    response.assert_status(StatusCode::OK);
    let tags: Vec<Tag> = response.json();
    assert_eq!(tags.iter().filter(|t| t.name == "Bullish").count(), 1);

    assert_eq!(
        created.tags.iter().find(|t| t.name == "Bullish").unwrap().id,
        second.tags.iter().find(|t| t.name == "Bullish").unwrap().id
    );
}

#[tokio::test]
async fn upload_validation_rejects_bad_payloads() {
    let _guard = DB_LOCK.lock().await;
    let Some(ctx) = setup().await else { return };

    // Not an image.
    let form = MultipartForm::new().add_part(
        "image",
        Part::bytes(b"plain text, definitely not pixels".to_vec())
            .file_name("notes.txt")
            .mime_type("text/plain"),
    );
    let response = ctx.server.post("/api/screenshots").multipart(form).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["field"], "image");

    // Over the 2 MiB ceiling.
    let mut oversized = tiny_png();
    oversized.resize(2 * 1024 * 1024 + 1, 0);
    let form = MultipartForm::new().add_part(
        "image",
        Part::bytes(oversized)
            .file_name("huge.png")
            .mime_type("image/png"),
    );
    let response = ctx.server.post("/api/screenshots").multipart(form).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // Missing image field entirely.
    let form = MultipartForm::new().add_text("title", "no image attached");
    let response = ctx.server.post("/api/screenshots").multipart(form).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // None of the failures persisted an entry.
    let response = ctx.server.get("/api/screenshots").await;
    let listed: Vec<Screenshot> = response.json();
    assert!(listed.is_empty());
}
