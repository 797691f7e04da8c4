//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::{
    // Command handlers
    SubmitRecommendHandler,
    // Query handlers
    GetSessionTaskHandler, GetTaskHandler,
    // Ports
    CancellationRegistryPort, PipelineJob, TaskStorePort,
};

/// 应用状态
pub struct AppState {
    // ========== Command Handlers ==========
    pub submit_recommend_handler: SubmitRecommendHandler,

    // ========== Query Handlers ==========
    pub get_session_task_handler: GetSessionTaskHandler,
    pub get_task_handler: GetTaskHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        registry: Arc<dyn CancellationRegistryPort>,
        task_store: Arc<dyn TaskStorePort>,
        job_sender: mpsc::Sender<PipelineJob>,
        max_sequence_len: usize,
    ) -> Self {
        Self {
            submit_recommend_handler: SubmitRecommendHandler::new(
                registry,
                task_store.clone(),
                job_sender,
                max_sequence_len,
            ),

            get_session_task_handler: GetSessionTaskHandler::new(task_store.clone()),
            get_task_handler: GetTaskHandler::new(task_store),
        }
    }
}
