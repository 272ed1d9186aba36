//! 混合排序引擎
//!
//! 一次搜索的流程：
//!
//! 1. 按分类字段精确筛选候选照片（[`Filters`]）
//! 2. 在候选集中做子串匹配（[`normalize`] / [`match_text`]）和/或向量余弦相似度评分（[`cosine`]）
//! 3. 由 [`HybridRanker`] 根据 [`SearchMode`] 决定使用哪种信号，以及文本无命中时的回退策略
//! 4. 按分数降序稳定排序并截断（[`assemble`]）

mod assemble;
mod filter;
mod ranker;
mod similarity;
mod text;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use self::assemble::*;
pub use self::filter::*;
pub use self::ranker::*;
pub use self::similarity::*;
pub use self::text::*;
use crate::embed::EmbedError;

/// 默认返回结果数量
pub const DEFAULT_LIMIT: usize = 100;
/// 返回结果数量的硬上限
pub const MAX_LIMIT: usize = 1000;

/// 搜索模式
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// 只做文本子串匹配，命中的照片分数均为 1.0
    Text,
    /// 只做向量相似度评分
    Semantic,
    /// 文本命中时相似度加分，无命中时回退为语义搜索
    #[default]
    Hybrid,
}

impl SearchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Semantic => "semantic",
            Self::Hybrid => "hybrid",
        }
    }

    /// 从请求参数解析搜索模式
    pub fn from_name(name: &str) -> Result<Self, SearchError> {
        match name {
            "text" => Ok(Self::Text),
            "semantic" => Ok(Self::Semantic),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(SearchError::Validation(format!(
                "未知的搜索模式 `{name}`，可选值为 text、semantic、hybrid"
            ))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// 请求参数无效，评分前即返回
    #[error("无效的搜索请求: {0}")]
    Validation(String),
    /// 嵌入服务不可用，且当前模式无法降级
    #[error("嵌入服务不可用: {0}")]
    DependencyUnavailable(#[source] EmbedError),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

/// 一次搜索请求，只能通过 [`SearchQuery::new`] 构造，保证参数已校验
#[derive(Debug, Clone)]
pub struct SearchQuery {
    text: String,
    filters: Filters,
    mode: SearchMode,
    limit: usize,
}

impl SearchQuery {
    /// 校验并创建搜索请求
    ///
    /// `limit` 小于 1 时返回 [`SearchError::Validation`]，超过 [`MAX_LIMIT`] 时截断为上限
    pub fn new(
        text: impl Into<String>,
        filters: Filters,
        mode: SearchMode,
        limit: i64,
    ) -> Result<Self, SearchError> {
        if limit < 1 {
            return Err(SearchError::Validation(format!("limit 必须为正整数，实际为 {limit}")));
        }
        let limit = usize::try_from(limit).unwrap_or(MAX_LIMIT).min(MAX_LIMIT);
        Ok(Self { text: text.into(), filters, mode, limit })
    }

    /// 原始查询文本，用于计算查询向量
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
