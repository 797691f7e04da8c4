//! Model Ports - 文本嵌入与序列打分
//!
//! 外部模型服务的抽象接口，具体实现在 infrastructure/adapters 层。
//! 嵌入与打分是两个独立的协作方，但通常由同一个模型服务提供

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recommendation::RankedCandidate;

/// 模型服务错误
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 序列编码 - Encode 阶段的输出、Score 阶段的输入
///
/// 不变量: name_vectors 与 event_indices 等长且保持序列顺序
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceEncoding {
    /// 每个商品名的嵌入向量
    pub name_vectors: Vec<Vec<f32>>,
    /// 每个行为的事件索引
    pub event_indices: Vec<u32>,
}

impl SequenceEncoding {
    pub fn len(&self) -> usize {
        self.event_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_indices.is_empty()
    }
}

/// Embedder Port
///
/// 文本嵌入：商品名 -> 定长数值向量。确定性，无副作用
#[async_trait]
pub trait EmbedderPort: Send + Sync {
    /// 批量嵌入文本，返回与输入等长的向量列表
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError>;
}

/// Scorer Port
///
/// 序列打分：序列编码 -> 候选商品及分数。
/// 输出不要求有序，排序与截断由流水线负责
#[async_trait]
pub trait ScorerPort: Send + Sync {
    async fn score(&self, encoding: &SequenceEncoding) -> Result<Vec<RankedCandidate>, ModelError>;
}
