//! Worker Infrastructure - 后台任务处理

mod rec_worker;

pub use rec_worker::{RecWorker, RecWorkerConfig};
