use super::{EmbeddingProvider, Result, l2_normalize};

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// 长度小于该值的词不参与哈希
const MIN_TOKEN_LEN: usize = 2;

/// 基于 FNV-1a 特征哈希的嵌入
///
/// 文本按小写字母数字切词，每个词哈希到一个维度并按哈希最高位决定正负；
/// 图片使用 blake3 的可扩展输出把文件字节展开为向量。两者都归一化为单位长度。
/// 只反映字面重合，不具备真正的语义。
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// # Panics
    ///
    /// `dimension` 为 0 时 panic
    pub fn new(dimension: usize) -> Self {
        assert!(dimension > 0, "dimension must be positive");
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.chars().count() >= MIN_TOKEN_LEN)
            .map(str::to_lowercase)
    }

    fn fnv1a_hash(bytes: &[u8]) -> u64 {
        let mut hash = FNV_OFFSET_BASIS;
        for byte in bytes {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    /// 空文本（或没有有效词）得到零向量
    pub fn embed_text_sync(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];
        for token in Self::tokenize(text) {
            let hash = Self::fnv1a_hash(token.as_bytes());
            let idx = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            embedding[idx] += sign;
        }
        l2_normalize(&mut embedding);
        embedding
    }

    pub fn embed_image_sync(&self, image: &[u8]) -> Vec<f32> {
        let mut bytes = vec![0u8; self.dimension];
        blake3::Hasher::new().update(image).finalize_xof().fill(&mut bytes);
        let mut embedding = bytes.into_iter().map(|b| b as f32 / 127.5 - 1.0).collect::<Vec<_>>();
        l2_normalize(&mut embedding);
        embedding
    }
}

impl EmbeddingProvider for HashEmbedder {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text_sync(text))
    }

    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>> {
        Ok(self.embed_image_sync(image))
    }
}
