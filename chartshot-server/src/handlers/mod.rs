pub mod screenshots;
pub mod tags;
pub mod upload_validation;

use axum::Json;
use serde_json::{json, Value};

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
