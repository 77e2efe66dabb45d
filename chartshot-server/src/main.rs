use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chartshot_core::{PostgresDatabase, ScreenshotImporter};
use chartshot_server::{create_app, AppState, Config};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "chartshot-server")]
#[command(about = "Screenshot catalog server with folder-derived tagging")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import screenshots from a directory tree into the catalog
    Import {
        /// Root to walk; defaults to the screenshots folder under the
        /// public storage root
        path: Option<PathBuf>,
    },
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Some(Command::Import { path }) => run_import(&config, path).await,
        Some(Command::Db(DbCommand::Migrate)) => run_db_migrate(&config).await,
        None => run_server(config).await,
    }
}

async fn connect(config: &Config) -> anyhow::Result<PostgresDatabase> {
    PostgresDatabase::new(&config.database.url)
        .await
        .context("failed to connect to PostgreSQL")
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let db = connect(config).await?;
    db.initialize_schema()
        .await
        .context("database migration failed")?;
    info!("database migrations applied");
    Ok(())
}

async fn run_import(config: &Config, path: Option<PathBuf>) -> anyhow::Result<()> {
    let db = connect(config).await?;
    db.initialize_schema()
        .await
        .context("database migration failed")?;

    let root = path.unwrap_or_else(|| config.screenshots_root());

    let importer = ScreenshotImporter::new(
        db.screenshots(),
        db.tags(),
        config.storage.public_root.clone(),
    );

    let outcome = importer
        .import(&root)
        .await
        .with_context(|| format!("import failed for {}", root.display()))?;

    println!("Imported {} screenshots.", outcome.total_files);
    if outcome.skipped > 0 {
        println!("({} already cataloged, {} new)", outcome.skipped, outcome.imported);
    }
    for error in &outcome.errors {
        eprintln!("warning: {error}");
    }

    Ok(())
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    config.ensure_directories()?;

    let db = connect(&config).await?;
    db.initialize_schema()
        .await
        .context("database migration failed")?;

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .context("CHARTSHOT_HOST is not a valid IP address")?,
        config.server.port,
    );

    let state = AppState::new(db, config);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "chartshot server listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
