//! Product Lookup Port - 商品价格/在售信息查询
//!
//! 外部购物搜索服务的抽象接口，按商品名逐条查询，
//! 单条失败不影响整个任务

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recommendation::ProductOffer;

/// 价格查询错误
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Product Lookup Port
///
/// 网络型协作方；调用方在取消后直接丢弃结果即可
#[async_trait]
pub trait ProductLookupPort: Send + Sync {
    /// 按商品名查询报价，无结果时返回 None
    async fn search(&self, item_name: &str) -> Result<Option<ProductOffer>, LookupError>;
}
