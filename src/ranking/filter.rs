use crate::db::ImageRecord;

/// 分类字段筛选条件，`None` 表示不限制
///
/// 与文本匹配不同，这里是大小写敏感的精确匹配
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub barrio: Option<String>,
    pub localidad: Option<String>,
    pub categoria: Option<String>,
}

impl Filters {
    /// 从请求参数创建筛选条件，空字符串视为未设置
    pub fn new(
        barrio: Option<String>,
        localidad: Option<String>,
        categoria: Option<String>,
    ) -> Self {
        let set = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self { barrio: set(barrio), localidad: set(localidad), categoria: set(categoria) }
    }

    pub fn is_empty(&self) -> bool {
        self.barrio.is_none() && self.localidad.is_none() && self.categoria.is_none()
    }

    /// 判断记录是否满足所有已设置的条件
    pub fn matches(&self, record: &ImageRecord) -> bool {
        let eq = |filter: &Option<String>, value: &str| filter.as_deref().is_none_or(|f| f == value);
        eq(&self.barrio, &record.barrio)
            && eq(&self.localidad, &record.localidad)
            && eq(&self.categoria, &record.categoria)
    }
}

/// 返回满足筛选条件的记录，保持原有顺序
pub fn apply_filters<'a>(records: &'a [ImageRecord], filters: &Filters) -> Vec<&'a ImageRecord> {
    records.iter().filter(|record| filters.matches(record)).collect()
}
