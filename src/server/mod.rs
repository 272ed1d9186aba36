mod api;
mod error;
mod state;
mod types;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;

pub use self::state::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::root_handler,
        api::search_handler,
        api::index_handler,
        api::filters_handler,
        api::stats_handler,
        api::analytics_handler,
    ),
    components(schemas(
        crate::ranking::SearchHit,
        crate::archive::FilterOptions,
        crate::archive::Analytics,
        crate::db::CategoriaCount,
        crate::db::BarrioCount,
        crate::db::LocalidadCount,
        types::IndexForm,
        types::IndexResponse,
        types::StatsResponse,
    ))
)]
pub struct ApiDoc;

/// 构建API服务器
pub fn create_app(state: Arc<AppState>) -> Router {
    let images = ServeDir::new(state.archive.conf_dir().images());
    Router::new()
        .route("/", get(api::root_handler))
        .route("/search", get(api::search_handler))
        .route("/index", post(api::index_handler))
        .route("/filters", get(api::filters_handler))
        .route("/stats", get(api::stats_handler))
        .route("/analytics", get(api::analytics_handler))
        .route("/metrics", get(api::metrics_handler))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest_service("/images", images)
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::disable())
        // 上传限制：10M
        .layer(RequestBodyLimitLayer::new(1024 * 1024 * 10))
        .with_state(state)
}
