//! HTTP Model Client - 调用外部模型服务
//!
//! 同一个模型服务同时提供嵌入与打分两个端点，
//! 因此一个客户端实现 EmbedderPort 和 ScorerPort 两个端口
//!
//! 外部模型 API:
//! POST {base_url}/api/model/embed
//! Request: {"texts": ["...", ...]}  Response: {"vectors": [[f32, ...], ...]}
//! POST {base_url}/api/model/score
//! Request: {"name_vectors": [[f32, ...], ...], "event_indices": [u32, ...]}
//! Response: {"candidates": [{"item_name": "...", "score": f32}, ...]}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{EmbedderPort, ModelError, ScorerPort, SequenceEncoding};
use crate::domain::recommendation::RankedCandidate;

#[derive(Debug, Serialize)]
struct EmbedHttpRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedHttpResponse {
    vectors: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct ScoreHttpRequest<'a> {
    name_vectors: &'a [Vec<f32>],
    event_indices: &'a [u32],
}

#[derive(Debug, Deserialize)]
struct ScoreHttpResponse {
    candidates: Vec<CandidateDto>,
}

#[derive(Debug, Deserialize)]
struct CandidateDto {
    item_name: String,
    score: f32,
}

/// HTTP Model 客户端配置
#[derive(Debug, Clone)]
pub struct HttpModelClientConfig {
    /// 模型服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpModelClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 60,
        }
    }
}

impl HttpModelClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP Model 客户端
pub struct HttpModelClient {
    client: Client,
    config: HttpModelClientConfig,
}

impl HttpModelClient {
    pub fn new(config: HttpModelClientConfig) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn embed_url(&self) -> String {
        format!("{}/api/model/embed", self.config.base_url)
    }

    fn score_url(&self) -> String {
        format!("{}/api/model/score", self.config.base_url)
    }

    fn map_send_error(e: reqwest::Error) -> ModelError {
        if e.is_timeout() {
            ModelError::Timeout
        } else if e.is_connect() {
            ModelError::NetworkError(format!("Cannot connect to model service: {}", e))
        } else {
            ModelError::NetworkError(e.to_string())
        }
    }
}

#[async_trait]
impl EmbedderPort for HttpModelClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        tracing::debug!(
            url = %self.embed_url(),
            text_count = texts.len(),
            "Sending embed request"
        );

        let response = self
            .client
            .post(&self.embed_url())
            .json(&EmbedHttpRequest { texts })
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ModelError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: EmbedHttpResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        Ok(body.vectors)
    }
}

#[async_trait]
impl ScorerPort for HttpModelClient {
    async fn score(
        &self,
        encoding: &SequenceEncoding,
    ) -> Result<Vec<RankedCandidate>, ModelError> {
        tracing::debug!(
            url = %self.score_url(),
            sequence_len = encoding.len(),
            "Sending score request"
        );

        let response = self
            .client
            .post(&self.score_url())
            .json(&ScoreHttpRequest {
                name_vectors: &encoding.name_vectors,
                event_indices: &encoding.event_indices,
            })
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ModelError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: ScoreHttpResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        Ok(body
            .candidates
            .into_iter()
            .map(|c| RankedCandidate::new(c.item_name, c.score))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpModelClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpModelClientConfig::new("http://model:9000").with_timeout(30);
        assert_eq!(config.base_url, "http://model:9000");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_urls() {
        let client = HttpModelClient::new(HttpModelClientConfig::new("http://model:9000")).unwrap();
        assert_eq!(client.embed_url(), "http://model:9000/api/model/embed");
        assert_eq!(client.score_url(), "http://model:9000/api/model/score");
    }
}
