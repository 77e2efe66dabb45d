//! Domain types shared across the chartshot workspace.
//!
//! This crate is deliberately free of database and HTTP coupling: the server
//! and core crates both speak in terms of these types, while persistence
//! details (row structs, query builders) stay in `chartshot-core`.

pub mod catalog;
pub mod ids;

pub use catalog::{NewScreenshot, Screenshot, Tag};
pub use ids::{ScreenshotId, TagId};
