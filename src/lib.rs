//! Serec - 序列推荐任务服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Behavior Context: 用户行为序列上下文
//! - Recommendation Context: 推荐结果上下文
//!
//! 应用层 (application/):
//! - Ports: 端口定义（TaskStore, CancellationRegistry, Embedder, Scorer, ProductLookup）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//! - Pipeline: 推荐流水线（编码 -> 打分 -> 富化）
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Memory: CancellationRegistry 内存实现
//! - Worker: RecWorker 后台任务处理
//! - Persistence: SQLite 任务存储
//! - Adapters: Model Client, Shopping Client

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
