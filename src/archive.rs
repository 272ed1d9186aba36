use std::time::Instant;

use anyhow::Result;
use log::{debug, info, warn};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::ConfDir;
use crate::db::{
    self, BarrioCount, CategoriaCount, Database, Field, ImageRecord, LocalidadCount, NewImage, crud,
};
use crate::embed::EmbeddingProvider;
use crate::metrics;
use crate::ranking::{Filters, HybridRanker, SearchError, SearchHit, SearchQuery};
use crate::utils::stored_filename;

/// 照片库：元数据数据库和 images 目录
pub struct PhotoArchive {
    conf_dir: ConfDir,
    db: Database,
}

pub struct PhotoArchiveBuilder {
    conf_dir: ConfDir,
    wal: bool,
}

impl PhotoArchiveBuilder {
    pub fn new(conf_dir: ConfDir) -> Self {
        Self { conf_dir, wal: true }
    }

    /// 是否启用 WAL 模式，默认启用
    pub fn wal(mut self, wal: bool) -> Self {
        self.wal = wal;
        self
    }

    pub async fn open(self) -> Result<PhotoArchive> {
        tokio::fs::create_dir_all(self.conf_dir.images()).await?;
        let db = db::init_db(self.conf_dir.database(), self.wal).await?;
        Ok(PhotoArchive { conf_dir: self.conf_dir, db })
    }
}

/// 新照片的元数据
#[derive(Debug, Clone, Default)]
pub struct ImageMetadata {
    pub original_path: String,
    pub barrio: String,
    pub localidad: String,
    pub categoria: String,
    pub descripcion: String,
}

impl ImageMetadata {
    /// 城镇和分类必须填写，街区和描述可以为空
    pub fn validate(&self) -> Result<(), SearchError> {
        let required = [
            ("original_path", &self.original_path),
            ("localidad", &self.localidad),
            ("categoria", &self.categoria),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SearchError::Validation(format!("{name} 不能为空")));
            }
        }
        Ok(())
    }
}

/// 可选的筛选值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FilterOptions {
    pub barrios: Vec<String>,
    pub localidades: Vec<String>,
    pub categorias: Vec<String>,
}

/// 照片库统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Analytics {
    pub total_imagenes: i64,
    /// 描述为 `[REVISAR]` 的照片数量
    pub pendientes_revisar: i64,
    pub categorias: Vec<CategoriaCount>,
    pub barrios: Vec<BarrioCount>,
    pub localidades: Vec<LocalidadCount>,
}

impl PhotoArchive {
    pub fn conf_dir(&self) -> &ConfDir {
        &self.conf_dir
    }

    /// 保存照片文件、计算嵌入向量并写入数据库，返回存储文件名
    ///
    /// # Arguments
    ///
    /// * `provider` - 嵌入服务
    /// * `file_name` - 上传时的文件名
    /// * `contents` - 照片文件内容
    /// * `meta` - 照片元数据
    pub async fn add_image<E: EmbeddingProvider>(
        &self,
        provider: &E,
        file_name: &str,
        contents: &[u8],
        meta: &ImageMetadata,
    ) -> Result<String> {
        meta.validate()?;

        let filename = stored_filename(&meta.original_path, file_name);
        let embedding =
            provider.embed_image(contents).await.map_err(SearchError::DependencyUnavailable)?;
        let path = self.conf_dir.images().join(&filename);
        tokio::fs::write(&path, contents).await?;

        let result = crud::add_image(
            &self.db,
            &NewImage {
                filename: &filename,
                original_path: &meta.original_path,
                barrio: &meta.barrio,
                localidad: &meta.localidad,
                categoria: &meta.categoria,
                descripcion: &meta.descripcion,
                embedding: &embedding,
            },
        )
        .await;
        let id = match result {
            Ok(id) => id,
            Err(e) => {
                // 写入数据库失败时删除已保存的文件
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!("无法删除文件 {}: {e}", path.display());
                }
                return Err(e.into());
            }
        };
        debug!("添加照片 {id}: {filename}");

        Ok(filename)
    }

    /// 检查原始路径是否已经添加过
    pub async fn contains(&self, original_path: &str) -> Result<bool> {
        Ok(crud::check_original_path(&self.db, original_path).await?)
    }

    /// 读取满足分类筛选条件的照片
    pub async fn load_records(&self, filters: &Filters) -> Result<Vec<ImageRecord>, SearchError> {
        let rows = crud::get_images(&self.db, filters).await?;
        Ok(rows.into_iter().map(ImageRecord::from).collect())
    }

    /// 搜索照片
    pub async fn search<E: EmbeddingProvider>(
        &self,
        provider: &E,
        query: &SearchQuery,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let start = Instant::now();
        metrics::inc_search_count(query.mode());

        let records = self.load_records(query.filters()).await?;
        let hits = HybridRanker::new(provider).rank(&records, query).await?;

        let elapsed = start.elapsed().as_secs_f64();
        metrics::observe_search_duration(query.mode(), elapsed);
        info!(
            "搜索 {:?} ({})：{} 条结果，耗时 {:.2}ms",
            query.text(),
            query.mode().as_str(),
            hits.len(),
            elapsed * 1000.
        );

        Ok(hits)
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(crud::count_images(&self.db).await?)
    }

    pub async fn filter_options(&self) -> Result<FilterOptions> {
        Ok(FilterOptions {
            barrios: crud::get_distinct(&self.db, Field::Barrio).await?,
            localidades: crud::get_distinct(&self.db, Field::Localidad).await?,
            categorias: crud::get_distinct(&self.db, Field::Categoria).await?,
        })
    }

    pub async fn analytics(&self) -> Result<Analytics> {
        Ok(Analytics {
            total_imagenes: crud::count_images(&self.db).await?,
            pendientes_revisar: crud::count_pending_review(&self.db).await?,
            categorias: grouped(crud::count_by(&self.db, Field::Categoria).await?),
            barrios: grouped(crud::count_by(&self.db, Field::Barrio).await?),
            localidades: grouped(crud::count_by(&self.db, Field::Localidad).await?),
        })
    }
}

fn grouped<T: From<db::FieldCount>>(counts: Vec<db::FieldCount>) -> Vec<T> {
    counts.into_iter().map(T::from).collect()
}
