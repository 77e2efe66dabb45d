//! PostgreSQL implementations of the repository ports.

pub mod screenshots;
pub mod tags;

pub use screenshots::PostgresScreenshotRepository;
pub use tags::PostgresTagRepository;
