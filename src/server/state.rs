use std::sync::Arc;

use crate::PhotoArchive;
use crate::embed::Embedder;

/// 应用状态
///
/// 请求之间只共享只读的数据库连接池和嵌入服务
pub struct AppState {
    /// 照片库
    pub archive: PhotoArchive,
    /// 嵌入服务
    pub embedder: Embedder,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(archive: PhotoArchive, embedder: Embedder) -> Arc<Self> {
        Arc::new(AppState { archive, embedder })
    }
}
