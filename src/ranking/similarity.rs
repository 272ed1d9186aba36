use log::warn;
use rayon::prelude::*;

use super::Scored;
use crate::db::ImageRecord;
use crate::metrics;

/// 计算两个向量的余弦相似度
///
/// 任一向量范数为 0 时余弦无定义，此时返回 0.0。浮点误差可能使结果略超出
/// `[-1, 1]`，返回前截断到该区间。调用方需保证两个向量维数相同。
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    let denom = norm_a * norm_b;
    if !denom.is_finite() || denom == 0.0 {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0)
}

/// 计算查询向量与记录嵌入向量的相似度，维数不一致时返回 `None`
pub fn record_similarity(query: &[f32], record: &ImageRecord) -> Option<f32> {
    if record.embedding.len() != query.len() {
        warn!(
            "跳过照片 {}：嵌入向量维数为 {}，查询向量维数为 {}",
            record.id,
            record.embedding.len(),
            query.len()
        );
        metrics::inc_skipped_record();
        return None;
    }
    Some(cosine(query, &record.embedding))
}

/// 对候选集做纯语义评分，维数不一致的记录被跳过，结果保持候选集顺序
pub fn score_semantic<'a>(candidates: &[&'a ImageRecord], query: &[f32]) -> Vec<Scored<'a>> {
    candidates
        .par_iter()
        .filter_map(|&record| {
            record_similarity(query, record).map(|score| Scored { record, score })
        })
        .collect()
}
