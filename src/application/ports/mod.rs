//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod cancellation;
mod model;
mod product_lookup;
mod task_store;

pub use cancellation::CancellationRegistryPort;
pub use model::{EmbedderPort, ModelError, ScorerPort, SequenceEncoding};
pub use product_lookup::{LookupError, ProductLookupPort};
pub use task_store::{RecommendTask, TaskStatus, TaskStoreError, TaskStorePort};
