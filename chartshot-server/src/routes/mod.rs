use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::{
    handlers::{
        health_handler, screenshots, tags,
        upload_validation::UPLOAD_BODY_LIMIT_BYTES,
    },
    infra::{app_state::AppState, config::CorsConfig},
};

/// Assemble the full application router: API routes under `/api`, health
/// probe, and static serving of the public storage root under `/storage`.
pub fn create_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.cors);
    let public_root = state.config.storage.public_root.clone();

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", create_api_router())
        .nest_service("/storage", ServeDir::new(public_root))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn create_api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/screenshots",
            get(screenshots::list_screenshots_handler)
                .post(screenshots::upload_screenshot_handler),
        )
        .route("/tags", get(tags::list_tags_handler))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT_BYTES))
}

fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.is_wildcard_included() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
