//! # chartshot server
//!
//! HTTP surface and CLI plumbing for the screenshot catalog:
//!
//! - **Listing**: `GET /api/screenshots` with comma-separated tag filtering
//!   and the default hide rule for drawing-annotated shots
//! - **Upload**: `POST /api/screenshots` multipart with size/type validation
//! - **Tags**: `GET /api/tags`
//! - **Static serving**: stored files under `/storage`
//!
//! The binary doubles as the operator CLI (`import`, `db migrate`).

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use errors::{AppError, AppResult};
pub use infra::app_state::AppState;
pub use infra::config::Config;
pub use routes::create_app;
