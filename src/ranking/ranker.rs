use log::{debug, info, warn};

use super::*;
use crate::db::ImageRecord;
use crate::embed::{EmbedError, EmbeddingProvider};
use crate::metrics;
use crate::utils::cpu_bound;

/// 描述字段命中时的加分
pub const DESCRIPCION_BOOST: f32 = 0.30;
/// 街区、城镇、分类字段命中时的加分
pub const FIELD_BOOST: f32 = 0.15;
/// 分数上限，加分后不会超过该值
pub const MAX_SCORE: f32 = 1.0;

/// 混合排序器
///
/// 不持有任何跨请求的状态，嵌入服务由调用方注入。每次搜索最多调用一次嵌入服务，
/// 文本模式下不会调用。
pub struct HybridRanker<'a, E> {
    provider: &'a E,
}

impl<'a, E: EmbeddingProvider> HybridRanker<'a, E> {
    pub fn new(provider: &'a E) -> Self {
        Self { provider }
    }

    /// 在 `records` 中执行一次搜索
    pub async fn rank(
        &self,
        records: &[ImageRecord],
        query: &SearchQuery,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let candidates = apply_filters(records, query.filters());
        let needle = normalize(query.text());
        debug!(
            "搜索模式 {}，查询 {:?}，候选 {}/{}",
            query.mode().as_str(),
            needle,
            candidates.len(),
            records.len()
        );

        let scored = match query.mode() {
            SearchMode::Text => cpu_bound(|| score_text(&match_text(&candidates, &needle))),
            SearchMode::Semantic => self.rank_semantic(&candidates, query).await?,
            SearchMode::Hybrid => {
                let hits = cpu_bound(|| match_text(&candidates, &needle));
                if hits.is_empty() {
                    info!("查询 {:?} 没有文本命中，回退为语义搜索", query.text());
                    metrics::inc_hybrid_fallback();
                    self.rank_semantic(&candidates, query).await?
                } else {
                    self.rank_boosted(&hits, query).await
                }
            }
        };

        Ok(assemble(scored, query.limit()))
    }

    async fn query_vector(&self, query: &SearchQuery) -> Result<Vec<f32>, EmbedError> {
        let result = self.provider.embed_text(query.text()).await;
        if result.is_err() {
            metrics::inc_embed_failure(query.mode());
        }
        result
    }

    async fn rank_semantic<'r>(
        &self,
        candidates: &[&'r ImageRecord],
        query: &SearchQuery,
    ) -> Result<Vec<Scored<'r>>, SearchError> {
        let vector = self.query_vector(query).await.map_err(SearchError::DependencyUnavailable)?;
        Ok(cpu_bound(|| score_semantic(candidates, &vector)))
    }

    /// 文本命中的记录按相似度加分；嵌入服务失败时降级为文本模式
    async fn rank_boosted<'r>(
        &self,
        hits: &[TextHit<'r>],
        query: &SearchQuery,
    ) -> Vec<Scored<'r>> {
        let vector = match self.query_vector(query).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!("嵌入服务失败，{} 个文本命中按文本模式返回: {e}", hits.len());
                return score_text(hits);
            }
        };

        cpu_bound(|| {
            hits.iter()
                .filter_map(|hit| {
                    let similarity = record_similarity(&vector, hit.record)?;
                    let boost = if hit.in_descripcion { DESCRIPCION_BOOST } else { FIELD_BOOST };
                    Some(Scored { record: hit.record, score: (similarity + boost).min(MAX_SCORE) })
                })
                .collect()
        })
    }
}

/// 文本命中的记录分数固定为 1.0
fn score_text<'r>(hits: &[TextHit<'r>]) -> Vec<Scored<'r>> {
    hits.iter().map(|hit| Scored { record: hit.record, score: MAX_SCORE }).collect()
}
