//! Repository contracts for the catalog store and the tag registry.

pub mod screenshots;
pub mod tags;

pub use screenshots::ScreenshotRepository;
pub use tags::TagRepository;
