//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TaskStore、CancellationRegistry、Embedder、Scorer、ProductLookup）
//! - pipeline: 可取消的三阶段推荐流水线
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::SubmitRecommendHandler, PipelineJob, SubmitRecommendCommand,
    SubmitRecommendResponse,
};

pub use error::ApplicationError;

pub use pipeline::{PipelineConfig, PipelineOutcome, RecommendPipeline};

pub use ports::{
    CancellationRegistryPort, EmbedderPort, LookupError, ModelError, ProductLookupPort,
    RecommendTask, ScorerPort, SequenceEncoding, TaskStatus, TaskStoreError, TaskStorePort,
};

pub use queries::{
    handlers::{GetSessionTaskHandler, GetTaskHandler},
    GetSessionTaskQuery, GetTaskQuery,
};
