use axum::{
    body::Bytes,
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use chartshot_model::{NewScreenshot, Screenshot};

use chartshot_core::{
    database::ports::{ScreenshotRepository, TagRepository},
    TagFilter,
};

use crate::{
    errors::{AppError, AppResult},
    handlers::upload_validation::validate_upload,
    infra::app_state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Comma-separated tag names, e.g. `?tags=Jan,Monday,5min,Bullish`.
    pub tags: Option<String>,
}

/// GET /api/screenshots - filtered listing with eager tag sets.
pub async fn list_screenshots_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<Screenshot>>> {
    let filter = TagFilter::from_query(params.tags.as_deref());
    let screenshots = state.db.screenshots().list(&filter).await?;
    Ok(Json(screenshots))
}

/// POST /api/screenshots - multipart upload of a single screenshot.
///
/// Fields: `image` (required file), `title` (optional), `tags` (repeatable;
/// `tags[]` is accepted for form-array clients).
pub async fn upload_screenshot_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Screenshot>)> {
    let mut image: Option<Bytes> = None;
    let mut title: Option<String> = None;
    let mut tag_names: Vec<String> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "image" => {
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::bad_request(format!("failed to read image field: {e}"))
                })?;
                image = Some(bytes);
            }
            "title" => {
                let text = field.text().await.map_err(|e| {
                    AppError::bad_request(format!("failed to read title field: {e}"))
                })?;
                if !text.is_empty() {
                    title = Some(text);
                }
            }
            "tags" | "tags[]" => {
                let text = field.text().await.map_err(|e| {
                    AppError::bad_request(format!("failed to read tags field: {e}"))
                })?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    tag_names.push(trimmed.to_owned());
                }
            }
            _ => {}
        }
    }

    let image =
        image.ok_or_else(|| AppError::validation("image", "an image file is required"))?;
    let accepted = validate_upload(&image)?;

    let stored_path = state
        .storage
        .store_screenshot(&image, accepted.extension)
        .await?;

    let created = state
        .db
        .screenshots()
        .create(NewScreenshot::new(title, stored_path))
        .await?;

    let mut tag_ids = Vec::with_capacity(tag_names.len());
    for name in &tag_names {
        tag_ids.push(state.db.tags().get_or_create(name).await?);
    }
    state.db.screenshots().sync_tags(created.id, &tag_ids).await?;

    info!(
        id = %created.id,
        path = %created.file_path,
        tags = tag_names.len(),
        "screenshot uploaded"
    );

    let screenshot = state
        .db
        .screenshots()
        .get(created.id)
        .await?
        .ok_or_else(|| AppError::internal("created screenshot not found on readback"))?;

    Ok((StatusCode::CREATED, Json(screenshot)))
}
