use std::cmp::Ordering;

use serde::Serialize;
use utoipa::ToSchema;

use crate::db::ImageRecord;

/// 带分数的候选记录
#[derive(Debug, Clone, Copy)]
pub struct Scored<'a> {
    pub record: &'a ImageRecord,
    pub score: f32,
}

/// 搜索结果，包含照片的公开字段和最终分数
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SearchHit {
    pub id: i64,
    pub filename: String,
    pub original_path: String,
    pub barrio: String,
    pub localidad: String,
    pub categoria: String,
    pub descripcion: String,
    /// 最终分数，文本模式下恒为 1.0
    pub similarity: f32,
}

impl From<Scored<'_>> for SearchHit {
    fn from(Scored { record, score }: Scored<'_>) -> Self {
        Self {
            id: record.id,
            filename: record.filename.clone(),
            original_path: record.original_path.clone(),
            barrio: record.barrio.clone(),
            localidad: record.localidad.clone(),
            categoria: record.categoria.clone(),
            descripcion: record.descripcion.clone(),
            similarity: score,
        }
    }
}

/// 按分数降序排序并截取前 `limit` 个
///
/// 排序是稳定的，同分记录保持输入顺序
pub fn assemble(mut scored: Vec<Scored<'_>>, limit: usize) -> Vec<SearchHit> {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.into_iter().take(limit).map(SearchHit::from).collect()
}
