//! HTTP Shopping Client - 调用外部购物搜索服务
//!
//! 实现 ProductLookupPort trait，按商品名查询价格/卖家/图片
//!
//! 外部购物搜索 API:
//! POST {base_url}/api/shopping/search
//! Request: {"query": "..."}  (JSON)
//! Response: {"products": [{"name": "...", "price": "...", "seller": "...", "image": "..."}, ...]}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{LookupError, ProductLookupPort};
use crate::domain::recommendation::ProductOffer;

#[derive(Debug, Serialize)]
struct SearchHttpRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchHttpResponse {
    products: Vec<ProductDto>,
}

#[derive(Debug, Deserialize)]
struct ProductDto {
    name: String,
    price: String,
    seller: String,
    #[serde(default)]
    image: String,
}

/// HTTP Shopping 客户端配置
#[derive(Debug, Clone)]
pub struct HttpShoppingClientConfig {
    /// 购物搜索服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpShoppingClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8100".to_string(),
            timeout_secs: 30,
        }
    }
}

impl HttpShoppingClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// HTTP Shopping 客户端
///
/// 取消后在途请求无法中断，结果由调用方丢弃
pub struct HttpShoppingClient {
    client: Client,
    config: HttpShoppingClientConfig,
}

impl HttpShoppingClient {
    pub fn new(config: HttpShoppingClientConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn search_url(&self) -> String {
        format!("{}/api/shopping/search", self.config.base_url)
    }
}

#[async_trait]
impl ProductLookupPort for HttpShoppingClient {
    async fn search(&self, item_name: &str) -> Result<Option<ProductOffer>, LookupError> {
        tracing::debug!(
            url = %self.search_url(),
            item_name = %item_name,
            "Sending shopping search request"
        );

        let response = self
            .client
            .post(&self.search_url())
            .json(&SearchHttpRequest { query: item_name })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout
                } else if e.is_connect() {
                    LookupError::NetworkError(format!(
                        "Cannot connect to shopping service: {}",
                        e
                    ))
                } else {
                    LookupError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: SearchHttpResponse = response
            .json()
            .await
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;

        // 取首个结果；无结果不是错误
        Ok(body.products.into_iter().next().map(|p| ProductOffer {
            name: p.name,
            price: p.price,
            seller: p.seller,
            image: p.image,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpShoppingClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8100");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_search_url() {
        let client =
            HttpShoppingClient::new(HttpShoppingClientConfig::new("http://shop:9100")).unwrap();
        assert_eq!(client.search_url(), "http://shop:9100/api/shopping/search");
    }
}
