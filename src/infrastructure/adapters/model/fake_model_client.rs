//! Fake Model Client - 用于测试的模型客户端
//!
//! 嵌入为确定性的字节折叠向量，打分返回预置候选，
//! 并统计各端口调用次数供断言使用

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::ports::{EmbedderPort, ModelError, ScorerPort, SequenceEncoding};
use crate::domain::recommendation::RankedCandidate;

/// 固定嵌入维度
const EMBED_DIM: usize = 8;

/// Fake Model Client
pub struct FakeModelClient {
    candidates: Vec<RankedCandidate>,
    embed_error: Option<String>,
    score_error: Option<String>,
    /// 每次打分前的人为延迟，用于模拟慢推理
    score_delay: Option<Duration>,
    embed_calls: AtomicUsize,
    score_calls: AtomicUsize,
}

impl FakeModelClient {
    /// 打分返回预置候选
    pub fn with_candidates(candidates: Vec<RankedCandidate>) -> Self {
        Self {
            candidates,
            embed_error: None,
            score_error: None,
            score_delay: None,
            embed_calls: AtomicUsize::new(0),
            score_calls: AtomicUsize::new(0),
        }
    }

    /// 嵌入端口始终失败
    pub fn failing_embed(message: impl Into<String>) -> Self {
        let mut client = Self::with_candidates(vec![]);
        client.embed_error = Some(message.into());
        client
    }

    /// 打分端口始终失败
    pub fn failing_score(message: impl Into<String>) -> Self {
        let mut client = Self::with_candidates(vec![]);
        client.score_error = Some(message.into());
        client
    }

    /// 打分前休眠指定时长
    pub fn with_score_delay(mut self, delay: Duration) -> Self {
        self.score_delay = Some(delay);
        self
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    pub fn score_calls(&self) -> usize {
        self.score_calls.load(Ordering::SeqCst)
    }

    /// 确定性嵌入：把字节折叠进固定维度向量
    fn embed_text(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; EMBED_DIM];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % EMBED_DIM] += byte as f32 / 255.0;
        }
        vector
    }
}

#[async_trait]
impl EmbedderPort for FakeModelClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.embed_error {
            return Err(ModelError::ServiceError(message.clone()));
        }

        Ok(texts.iter().map(|t| Self::embed_text(t)).collect())
    }
}

#[async_trait]
impl ScorerPort for FakeModelClient {
    async fn score(
        &self,
        _encoding: &SequenceEncoding,
    ) -> Result<Vec<RankedCandidate>, ModelError> {
        self.score_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.score_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.score_error {
            return Err(ModelError::ServiceError(message.clone()));
        }

        Ok(self.candidates.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embedding_is_deterministic_and_fixed_length() {
        let client = FakeModelClient::with_candidates(vec![]);

        let texts = vec!["ShoeA".to_string(), "BagB".to_string()];
        let first = client.embed(&texts).await.unwrap();
        let second = client.embed(&texts).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|v| v.len() == EMBED_DIM));
        assert_ne!(first[0], first[1]);
        assert_eq!(client.embed_calls(), 2);
    }

    #[tokio::test]
    async fn test_failing_embed_counts_calls() {
        let client = FakeModelClient::failing_embed("down");
        let result = client.embed(&["ShoeA".to_string()]).await;
        assert!(result.is_err());
        assert_eq!(client.embed_calls(), 1);
    }

    #[tokio::test]
    async fn test_score_returns_configured_candidates() {
        let client = FakeModelClient::with_candidates(vec![RankedCandidate::new("Shoe", 0.9)]);
        let encoding = SequenceEncoding {
            name_vectors: vec![vec![0.0; EMBED_DIM]],
            event_indices: vec![1],
        };
        let candidates = client.score(&encoding).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(client.score_calls(), 1);
    }
}
