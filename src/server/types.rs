use axum::body::Bytes;
use axum_typed_multipart::{FieldData, TryFromMultipart};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::archive::ImageMetadata;
use crate::ranking::{DEFAULT_LIMIT, Filters, SearchError, SearchMode, SearchQuery};

/// 搜索请求参数
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// 查询文本，可以为空
    pub query: String,
    /// 街区，精确匹配
    pub barrio: Option<String>,
    /// 城镇，精确匹配
    pub localidad: Option<String>,
    /// 分类，精确匹配
    pub categoria: Option<String>,
    /// 返回结果数量，默认 100，最大 1000
    pub limit: Option<i64>,
    /// 搜索模式：text、semantic、hybrid，默认 hybrid
    pub mode: Option<String>,
}

impl SearchParams {
    pub fn into_query(self) -> Result<SearchQuery, SearchError> {
        let mode = match self.mode.as_deref() {
            Some(mode) => SearchMode::from_name(mode)?,
            None => SearchMode::default(),
        };
        let filters = Filters::new(self.barrio, self.localidad, self.categoria);
        SearchQuery::new(self.query, filters, mode, self.limit.unwrap_or(DEFAULT_LIMIT as i64))
    }
}

/// 上传照片请求
#[derive(TryFromMultipart)]
pub struct IndexRequest {
    pub file: FieldData<Bytes>,
    pub original_path: String,
    pub barrio: Option<String>,
    pub localidad: String,
    pub categoria: String,
    pub descripcion: Option<String>,
}

impl IndexRequest {
    pub fn metadata(&self) -> ImageMetadata {
        ImageMetadata {
            original_path: self.original_path.clone(),
            barrio: self.barrio.clone().unwrap_or_default(),
            localidad: self.localidad.clone(),
            categoria: self.categoria.clone(),
            descripcion: self.descripcion.clone().unwrap_or_default(),
        }
    }
}

/// 上传照片表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct IndexForm {
    /// 照片文件
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// 照片的原始路径
    pub original_path: String,
    /// 街区，可以为空
    pub barrio: Option<String>,
    /// 城镇
    pub localidad: String,
    /// 分类
    pub categoria: String,
    /// 描述，可以为空
    pub descripcion: Option<String>,
}

/// 上传照片响应
#[derive(Debug, Serialize, ToSchema)]
pub struct IndexResponse {
    pub status: String,
    /// 存储文件名，可通过 `/images/{filename}` 访问
    pub filename: String,
}

/// 照片总数
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_imagenes: i64,
}
