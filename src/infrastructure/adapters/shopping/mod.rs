//! Shopping Adapter - 购物搜索客户端实现

mod fake_shopping_client;
mod http_shopping_client;

pub use fake_shopping_client::FakeShoppingClient;
pub use http_shopping_client::{HttpShoppingClient, HttpShoppingClientConfig};
