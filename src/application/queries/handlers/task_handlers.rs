//! Task Query Handlers - 状态读路径
//!
//! 只读 Task Store，从不等待流水线

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{RecommendTask, TaskStorePort};
use crate::application::queries::recommend_queries::{GetSessionTaskQuery, GetTaskQuery};

/// GetSessionTask Handler - 查询会话当前任务
pub struct GetSessionTaskHandler {
    task_store: Arc<dyn TaskStorePort>,
}

impl GetSessionTaskHandler {
    pub fn new(task_store: Arc<dyn TaskStorePort>) -> Self {
        Self { task_store }
    }

    pub async fn handle(
        &self,
        query: GetSessionTaskQuery,
    ) -> Result<RecommendTask, ApplicationError> {
        self.task_store
            .find_current(&query.session_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Session task", &query.session_id))
    }
}

/// GetTask Handler - 按 task_id 查询任务
pub struct GetTaskHandler {
    task_store: Arc<dyn TaskStorePort>,
}

impl GetTaskHandler {
    pub fn new(task_store: Arc<dyn TaskStorePort>) -> Self {
        Self { task_store }
    }

    pub async fn handle(&self, query: GetTaskQuery) -> Result<RecommendTask, ApplicationError> {
        self.task_store
            .find_by_id(&query.task_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Task", &query.task_id))
    }
}
