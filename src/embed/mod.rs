//! 嵌入向量提供方
//!
//! 排序引擎只依赖 [`EmbeddingProvider`]，具体实现通过命令行参数选择：
//!
//! - [`HashEmbedder`]：离线、确定性的特征哈希，适合测试和没有模型服务的环境
//! - [`HttpEmbedder`]：调用外部模型服务（例如 CLIP）

mod hash;
mod http;

use std::future::Future;
use std::time::Duration;

pub use self::hash::*;
pub use self::http::*;
use crate::config::{EmbedOptions, EmbedderKind};

pub type Result<T, E = EmbedError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("{message}")]
    InvalidConfig { message: String },
    #[error("{message}")]
    InvalidResponse { message: String },
    #[error("嵌入向量维数为 {actual}，期望 {expected}")]
    Dimension { expected: usize, actual: usize },
}

/// 把文本或图片映射为固定维数的向量
///
/// 同一模型版本下对同一输入的结果是确定的
pub trait EmbeddingProvider: Send + Sync {
    /// 计算文本的嵌入向量
    fn embed_text(&self, text: &str) -> impl Future<Output = Result<Vec<f32>>> + Send;
    /// 计算图片（原始文件字节）的嵌入向量
    fn embed_image(&self, image: &[u8]) -> impl Future<Output = Result<Vec<f32>>> + Send;
}

/// 根据配置选择的嵌入服务
#[derive(Debug, Clone)]
pub enum Embedder {
    Hash(HashEmbedder),
    Http(HttpEmbedder),
}

impl Embedder {
    pub fn from_options(opts: &EmbedOptions) -> Result<Self> {
        let dimension = opts.dimension as usize;
        match opts.embedder {
            EmbedderKind::Hash => Ok(Self::Hash(HashEmbedder::new(dimension))),
            EmbedderKind::Http => {
                let url = opts.embed_url.as_deref().ok_or_else(|| EmbedError::InvalidConfig {
                    message: "使用 http 嵌入服务时必须指定 --embed-url".to_string(),
                })?;
                let timeout = Duration::from_millis(opts.embed_timeout_ms);
                Ok(Self::Http(HttpEmbedder::new(url, dimension, timeout)?))
            }
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            Self::Hash(e) => e.dimension(),
            Self::Http(e) => e.dimension(),
        }
    }
}

impl EmbeddingProvider for Embedder {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        match self {
            Self::Hash(e) => e.embed_text(text).await,
            Self::Http(e) => e.embed_text(text).await,
        }
    }

    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>> {
        match self {
            Self::Hash(e) => e.embed_image(image).await,
            Self::Http(e) => e.embed_image(image).await,
        }
    }
}

/// 把向量归一化为单位长度，零向量保持不变
pub(crate) fn l2_normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in vec.iter_mut() {
            *x /= norm;
        }
    }
}
