//! Model Adapter - 外部模型服务客户端

mod fake_model_client;
mod http_model_client;

pub use fake_model_client::FakeModelClient;
pub use http_model_client::{HttpModelClient, HttpModelClientConfig};
