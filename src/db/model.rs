use log::warn;
use serde::Serialize;
use utoipa::ToSchema;

/// 已索引的照片
///
/// 记录在入库后即为只读，排序引擎不会修改它
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// 照片 ID
    pub id: i64,
    /// 存储在 images 目录下的文件名
    pub filename: String,
    /// 入库时的原始路径
    pub original_path: String,
    /// 街区，可以为空
    pub barrio: String,
    /// 城镇
    pub localidad: String,
    /// 分类
    pub categoria: String,
    /// 自由文本描述，可以为空
    pub descripcion: String,
    /// 入库时计算的嵌入向量，无法解码时为空
    pub embedding: Vec<f32>,
}

/// `image` 表中的一行，嵌入向量以 JSON 文本保存
#[derive(Debug, sqlx::FromRow)]
pub struct ImageRow {
    pub id: i64,
    pub filename: String,
    pub original_path: String,
    pub barrio: String,
    pub localidad: String,
    pub categoria: String,
    pub descripcion: String,
    pub embedding: String,
}

impl From<ImageRow> for ImageRecord {
    fn from(row: ImageRow) -> Self {
        let embedding = match serde_json::from_str::<Vec<f32>>(&row.embedding) {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("照片 {} 的嵌入向量无法解码，将不参与语义评分: {e}", row.id);
                vec![]
            }
        };
        Self {
            id: row.id,
            filename: row.filename,
            original_path: row.original_path,
            barrio: row.barrio,
            localidad: row.localidad,
            categoria: row.categoria,
            descripcion: row.descripcion,
            embedding,
        }
    }
}

/// 待写入的新照片
#[derive(Debug, Clone)]
pub struct NewImage<'a> {
    pub filename: &'a str,
    pub original_path: &'a str,
    pub barrio: &'a str,
    pub localidad: &'a str,
    pub categoria: &'a str,
    pub descripcion: &'a str,
    pub embedding: &'a [f32],
}

/// 可用于分类筛选的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Barrio,
    Localidad,
    Categoria,
}

impl Field {
    pub fn column(self) -> &'static str {
        match self {
            Self::Barrio => "barrio",
            Self::Localidad => "localidad",
            Self::Categoria => "categoria",
        }
    }
}

/// 某个字段取值的照片数量
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FieldCount {
    pub value: String,
    pub total: i64,
}

/// 分类统计，序列化为 `{"categoria", "total"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoriaCount {
    pub categoria: String,
    pub total: i64,
}

/// 街区统计，序列化为 `{"barrio", "total"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BarrioCount {
    pub barrio: String,
    pub total: i64,
}

/// 城镇统计，序列化为 `{"localidad", "total"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LocalidadCount {
    pub localidad: String,
    pub total: i64,
}

impl From<FieldCount> for CategoriaCount {
    fn from(FieldCount { value, total }: FieldCount) -> Self {
        Self { categoria: value, total }
    }
}

impl From<FieldCount> for BarrioCount {
    fn from(FieldCount { value, total }: FieldCount) -> Self {
        Self { barrio: value, total }
    }
}

impl From<FieldCount> for LocalidadCount {
    fn from(FieldCount { value, total }: FieldCount) -> Self {
        Self { localidad: value, total }
    }
}
