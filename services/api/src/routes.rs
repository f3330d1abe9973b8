//! API service routes

use axum::{
    Json, Router,
    extract::State,
    http::{Method, header},
    middleware,
    response::{IntoResponse, Redirect},
    routing::get,
};
use axum_extra::{TypedHeader, headers::Host};
use common::ServerConfig;
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::{
    AppState, dashboard::dashboard, middleware::log_requests, models::VideoListResponse,
    streaming::stream_content,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let thumbnails = ServeDir::new(state.config.thumbnail_dir.clone());

    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health_check))
        .route("/api/videos", get(list_videos))
        .route("/videos", get(legacy_videos))
        .route("/content/:filename", get(stream_content))
        .nest_service("/thumbs", thumbnails)
        .layer(middleware::from_fn(log_requests))
        .layer(build_cors())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

/// CORS policy open to browsers and native clients alike
pub fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::RANGE, header::ACCEPT])
        .expose_headers([
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
            header::CONTENT_LENGTH,
        ])
}

/// Authority to embed in generated URLs, as the client addressed us
pub fn request_host(host: Option<TypedHeader<Host>>, config: &ServerConfig) -> String {
    match host {
        Some(TypedHeader(host)) => match host.port() {
            Some(port) => format!("{}:{}", host.hostname(), port),
            None => host.hostname().to_string(),
        },
        None => format!("localhost:{}", config.port),
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "vod-server"
    }))
}

/// Catalog of playable videos for the mobile client
pub async fn list_videos(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
) -> Json<VideoListResponse> {
    let host = request_host(host, &state.config);
    let videos = state.catalog.list_catalog(&host).await;

    Json(VideoListResponse::ok(videos))
}

/// Old listing path kept for existing clients
pub async fn legacy_videos() -> Redirect {
    Redirect::to("/api/videos")
}
