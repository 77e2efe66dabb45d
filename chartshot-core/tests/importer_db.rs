//! Importer tests against a real PostgreSQL instance.
//!
//! Set `TEST_DATABASE_URL` to run these; without it each test prints a skip
//! notice and passes.

use std::fs;
use std::path::Path;

use sqlx::postgres::PgPoolOptions;

use chartshot_core::catalog::filter::TagFilter;
use chartshot_core::database::ports::{ScreenshotRepository, TagRepository};
use chartshot_core::{PostgresDatabase, ScreenshotImporter};

// Tests share one database and reset it on setup; serialize them.
static DB_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

async fn setup_db() -> Option<PostgresDatabase> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    sqlx::query("TRUNCATE screenshots, tags CASCADE")
        .execute(&pool)
        .await
        .expect("failed to reset tables");

    Some(PostgresDatabase::from_pool(pool))
}

fn write_tree(public_root: &Path) {
    let deep = public_root.join("screenshots/2024/Jan/Monday/5min/Bullish");
    fs::create_dir_all(&deep).unwrap();
    fs::write(deep.join("shot1.png"), b"png-bytes").unwrap();

    let shallow = public_root.join("screenshots");
    fs::write(shallow.join("untagged.png"), b"png-bytes").unwrap();
}

#[tokio::test]
async fn import_is_idempotent_and_derives_folder_tags() {
    let _guard = DB_LOCK.lock().await;
    let Some(db) = setup_db().await else { return };

    let tmp = tempfile::tempdir().unwrap();
    write_tree(tmp.path());

    let importer = ScreenshotImporter::new(db.screenshots(), db.tags(), tmp.path());
    let root = tmp.path().join("screenshots");

    let first = importer.import(&root).await.unwrap();
    assert_eq!(first.total_files, 2);
    assert_eq!(first.imported, 2);
    assert_eq!(first.skipped, 0);
    assert!(first.errors.is_empty());

    // Second run over the unchanged tree: same totals, nothing new.
    let second = importer.import(&root).await.unwrap();
    assert_eq!(second.total_files, 2);
    assert_eq!(second.imported, 0);
    assert_eq!(second.skipped, 2);
    assert!(second.errors.is_empty());

    let all = db
        .screenshots()
        .list(&TagFilter::from_query(None))
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let tagged = all
        .iter()
        .find(|s| s.file_path.ends_with("shot1.png"))
        .expect("deep screenshot missing");
    let names: Vec<&str> = tagged.tags.iter().map(|t| t.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec!["2024", "5min", "Bullish", "Jan", "Monday"]);
    assert_eq!(tagged.title.as_deref(), Some("shot1"));

    let untagged = all
        .iter()
        .find(|s| s.file_path == "screenshots/untagged.png")
        .expect("shallow screenshot missing");
    assert!(untagged.tags.is_empty());
}

#[tokio::test]
async fn missing_root_aborts_the_run() {
    let _guard = DB_LOCK.lock().await;
    let Some(db) = setup_db().await else { return };

    let importer =
        ScreenshotImporter::new(db.screenshots(), db.tags(), "storage/public");
    let err = importer
        .import(Path::new("/definitely/not/here"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        chartshot_core::CatalogError::PathNotFound(_)
    ));
}

#[tokio::test]
async fn shared_tag_names_resolve_to_one_row() {
    let _guard = DB_LOCK.lock().await;
    let Some(db) = setup_db().await else { return };

    let first = db.tags().get_or_create("Bullish").await.unwrap();
    let second = db.tags().get_or_create("Bullish").await.unwrap();
    assert_eq!(first, second);

    let all = db.tags().list_all().await.unwrap();
    assert_eq!(all.iter().filter(|t| t.name == "Bullish").count(), 1);
}
