use axum::{extract::State, Json};

use chartshot_core::database::ports::TagRepository;
use chartshot_model::Tag;

use crate::{errors::AppResult, infra::app_state::AppState};

/// GET /api/tags - every tag in the registry, sorted by name.
pub async fn list_tags_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Tag>>> {
    let tags = state.db.tags().list_all().await?;
    Ok(Json(tags))
}
