use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum_typed_multipart::TypedMultipart;
use log::info;
use serde_json::{Value, json};

use super::error::Result;
use super::state::AppState;
use super::types::*;
use crate::archive::{Analytics, FilterOptions};
use crate::metrics;
use crate::ranking::{SearchError, SearchHit};

/// 服务状态
#[utoipa::path(get, path = "/")]
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "fotosearch: archivo fotográfico de Córdoba" }))
}

/// 按文本、分类和视觉相似度搜索照片
#[utoipa::path(
    get,
    path = "/search",
    params(SearchParams),
    responses(
        (status = 200, body = [SearchHit]),
        (status = 400, description = "参数无效"),
        (status = 503, description = "嵌入服务不可用"),
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<SearchHit>>> {
    // 参数缺失或类型错误同样按校验错误返回 {"detail": ...}
    let Query(params) = params.map_err(|e| SearchError::Validation(e.body_text()))?;
    let query = params.into_query()?;
    let hits = state.archive.search(&state.embedder, &query).await?;
    Ok(Json(hits))
}

/// 上传并索引一张照片
#[utoipa::path(
    post,
    path = "/index",
    request_body(content = IndexForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = IndexResponse),
    )
)]
pub async fn index_handler(
    State(state): State<Arc<AppState>>,
    data: TypedMultipart<IndexRequest>,
) -> Result<Json<IndexResponse>> {
    let file_name = data.file.metadata.file_name.as_deref().unwrap_or("image");
    let meta = data.metadata();

    info!("正在索引上传照片: {}", meta.original_path);
    let filename = state
        .archive
        .add_image(&state.embedder, file_name, &data.file.contents, &meta)
        .await?;

    Ok(Json(IndexResponse { status: "ok".to_string(), filename }))
}

/// 获取所有可用的筛选值
#[utoipa::path(
    get,
    path = "/filters",
    responses(
        (status = 200, body = FilterOptions),
    )
)]
pub async fn filters_handler(State(state): State<Arc<AppState>>) -> Result<Json<FilterOptions>> {
    Ok(Json(state.archive.filter_options().await?))
}

/// 获取照片总数
#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, body = StatsResponse),
    )
)]
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>> {
    Ok(Json(StatsResponse { total_imagenes: state.archive.count().await? }))
}

/// 获取详细统计信息
#[utoipa::path(
    get,
    path = "/analytics",
    responses(
        (status = 200, body = Analytics),
    )
)]
pub async fn analytics_handler(State(state): State<Arc<AppState>>) -> Result<Json<Analytics>> {
    Ok(Json(state.archive.analytics().await?))
}

/// prometheus 指标
pub async fn metrics_handler() -> Result<impl IntoResponse> {
    let body = metrics::gather_text()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
