use sqlx::{Executor, QueryBuilder, Result, Sqlite, SqlitePool};

use super::{Field, FieldCount, ImageRow, NewImage};
use crate::ranking::Filters;

/// 添加照片记录
pub async fn add_image<'c, E>(executor: E, image: &NewImage<'_>) -> Result<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    let embedding = serde_json::to_string(image.embedding)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO image (filename, original_path, barrio, localidad, categoria, descripcion, embedding)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(image.filename)
    .bind(image.original_path)
    .bind(image.barrio)
    .bind(image.localidad)
    .bind(image.categoria)
    .bind(image.descripcion)
    .bind(embedding)
    .fetch_one(executor)
    .await?;

    Ok(id)
}

/// 检查原始路径是否已经入库
pub async fn check_original_path(executor: &SqlitePool, path: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM image WHERE original_path = ?")
        .bind(path)
        .fetch_one(executor)
        .await?;

    Ok(count > 0)
}

/// 按分类筛选条件读取照片，条件为精确匹配
pub async fn get_images(executor: &SqlitePool, filters: &Filters) -> Result<Vec<ImageRow>> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT id, filename, original_path, barrio, localidad, categoria, descripcion, embedding
        FROM image WHERE 1 = 1
        "#,
    );
    if let Some(barrio) = &filters.barrio {
        qb.push(" AND barrio = ").push_bind(barrio.as_str());
    }
    if let Some(localidad) = &filters.localidad {
        qb.push(" AND localidad = ").push_bind(localidad.as_str());
    }
    if let Some(categoria) = &filters.categoria {
        qb.push(" AND categoria = ").push_bind(categoria.as_str());
    }
    qb.push(" ORDER BY id ASC");

    qb.build_query_as::<ImageRow>().fetch_all(executor).await
}

/// 查询照片总数
pub async fn count_images(executor: &SqlitePool) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM image").fetch_one(executor).await
}

/// 查询描述待审核（`[REVISAR]`）的照片数量
pub async fn count_pending_review(executor: &SqlitePool) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM image WHERE descripcion = '[REVISAR]'")
        .fetch_one(executor)
        .await
}

/// 查询字段的所有不同取值，按字典序排列
///
/// NOTE: 街区允许为空，空值不作为可选项返回
pub async fn get_distinct(executor: &SqlitePool, field: Field) -> Result<Vec<String>> {
    let column = field.column();
    let sql = format!(
        "SELECT DISTINCT {column} FROM image {} ORDER BY {column} ASC",
        skip_empty(field)
    );
    sqlx::query_scalar(&sql).fetch_all(executor).await
}

/// 按字段分组统计照片数量，数量多的在前
pub async fn count_by(executor: &SqlitePool, field: Field) -> Result<Vec<FieldCount>> {
    let column = field.column();
    let sql = format!(
        "SELECT {column} AS value, COUNT(*) AS total FROM image {} \
         GROUP BY {column} ORDER BY total DESC, value ASC",
        skip_empty(field)
    );
    sqlx::query_as(&sql).fetch_all(executor).await
}

fn skip_empty(field: Field) -> &'static str {
    match field {
        Field::Barrio => "WHERE barrio != ''",
        Field::Localidad | Field::Categoria => "",
    }
}
