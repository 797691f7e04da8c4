//! Fake Shopping Client - 用于测试的购物查询客户端
//!
//! 按商品名生成确定性报价；可按名字配置"查不到"或"查询失败"，
//! 并统计调用次数供断言使用

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::ports::{LookupError, ProductLookupPort};
use crate::domain::recommendation::ProductOffer;

/// Fake Shopping Client
pub struct FakeShoppingClient {
    missing: HashSet<String>,
    failing: HashSet<String>,
    /// 每次查询前的人为延迟，用于模拟慢网络
    delay: Option<Duration>,
    search_calls: AtomicUsize,
}

impl FakeShoppingClient {
    /// 所有查询都返回确定性报价
    pub fn always_found() -> Self {
        Self {
            missing: HashSet::new(),
            failing: HashSet::new(),
            delay: None,
            search_calls: AtomicUsize::new(0),
        }
    }

    /// 指定商品名返回"无结果"
    pub fn with_missing(mut self, item_name: impl Into<String>) -> Self {
        self.missing.insert(item_name.into());
        self
    }

    /// 指定商品名返回查询错误
    pub fn with_failing(mut self, item_name: impl Into<String>) -> Self {
        self.failing.insert(item_name.into());
        self
    }

    /// 每次查询前休眠指定时长
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductLookupPort for FakeShoppingClient {
    async fn search(&self, item_name: &str) -> Result<Option<ProductOffer>, LookupError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(item_name) {
            return Err(LookupError::ServiceError(format!(
                "scripted failure for {}",
                item_name
            )));
        }

        if self.missing.contains(item_name) {
            return Ok(None);
        }

        Ok(Some(ProductOffer {
            name: format!("{} (offer)", item_name),
            price: format!("¥{}", 100 * (item_name.len() + 1)),
            seller: format!("seller-of-{}", item_name.to_lowercase()),
            image: format!("https://example.com/{}.jpg", item_name.to_lowercase()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_found_offer_is_deterministic() {
        let client = FakeShoppingClient::always_found();
        let first = client.search("ShoeA").await.unwrap().unwrap();
        let second = client.search("ShoeA").await.unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(client.search_calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_and_failing_scripts() {
        let client = FakeShoppingClient::always_found()
            .with_missing("Gone")
            .with_failing("Broken");

        assert!(client.search("Gone").await.unwrap().is_none());
        assert!(client.search("Broken").await.is_err());
        assert!(client.search("Fine").await.unwrap().is_some());
    }
}
