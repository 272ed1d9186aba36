use std::time::Duration;

use log::debug;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use super::{EmbedError, EmbeddingProvider, Result};

/// 通过 HTTP 调用外部模型服务
///
/// 约定的接口：
///
/// - `POST {url}/embed/text`，请求体 `{"text": "..."}`
/// - `POST {url}/embed/image`，请求体为图片原始字节
///
/// 两者均返回 `{"embedding": [...]}`
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: Client,
    base_url: String,
    dimension: usize,
}

impl HttpEmbedder {
    pub fn new(base_url: &str, dimension: usize, timeout: Duration) -> Result<Self> {
        if base_url.is_empty() {
            return Err(EmbedError::InvalidConfig { message: "嵌入服务地址不能为空".to_string() });
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string(), dimension })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl EmbeddingProvider for HttpEmbedder {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        debug!("请求文本嵌入: {:?}", text);
        let res = self
            .client
            .post(self.url("/embed/text"))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;
        let json: Value = res.error_for_status()?.json().await?;
        parse_embedding_response(json, self.dimension)
    }

    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>> {
        debug!("请求图片嵌入: {} 字节", image.len());
        let res = self
            .client
            .post(self.url("/embed/image"))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await?;
        let json: Value = res.error_for_status()?.json().await?;
        parse_embedding_response(json, self.dimension)
    }
}

fn parse_embedding_response(json: Value, dimension: usize) -> Result<Vec<f32>> {
    let values = json.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
        EmbedError::InvalidResponse { message: "嵌入服务的响应缺少 embedding 数组".to_string() }
    })?;

    let mut vec = Vec::with_capacity(values.len());
    for value in values {
        let number = value.as_f64().ok_or_else(|| EmbedError::InvalidResponse {
            message: "嵌入向量的元素必须是数字".to_string(),
        })?;
        vec.push(number as f32);
    }

    if vec.len() != dimension {
        return Err(EmbedError::Dimension { expected: dimension, actual: vec.len() });
    }

    Ok(vec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_embedding() {
        let json = serde_json::json!({ "embedding": [0.5, -1.5, 2] });
        assert_eq!(parse_embedding_response(json, 3).unwrap(), vec![0.5, -1.5, 2.0]);
    }

    #[test]
    fn test_parse_missing_embedding() {
        let json = serde_json::json!({ "data": [] });
        assert!(matches!(
            parse_embedding_response(json, 3),
            Err(EmbedError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_parse_non_numeric() {
        let json = serde_json::json!({ "embedding": [0.5, "x"] });
        assert!(matches!(
            parse_embedding_response(json, 2),
            Err(EmbedError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_parse_wrong_dimension() {
        let json = serde_json::json!({ "embedding": [0.5, 1.0] });
        assert!(matches!(
            parse_embedding_response(json, 512),
            Err(EmbedError::Dimension { expected: 512, actual: 2 })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // 端口 9 (discard) 通常没有监听
        let e = HttpEmbedder::new("http://127.0.0.1:9/", 4, Duration::from_millis(500)).unwrap();
        assert!(e.embed_text("plaza").await.is_err());
    }

    #[test]
    fn test_empty_url() {
        assert!(matches!(
            HttpEmbedder::new("", 4, Duration::from_secs(1)),
            Err(EmbedError::InvalidConfig { .. })
        ));
    }
}
