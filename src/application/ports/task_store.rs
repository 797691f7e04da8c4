//! Task Store Port - 推荐任务持久化
//!
//! 定义任务存储的抽象接口，具体实现在 infrastructure/persistence 层

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::behavior::BehaviorRecord;
use crate::domain::recommendation::RecommendedProduct;

/// Task Store 错误
#[derive(Debug, Error)]
pub enum TaskStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 任务状态
///
/// pending 为唯一非终态；completed/failed/cancelled 均为终态，
/// 终态之间不允许迁移
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// 排队或推理中
    Pending,
    /// 推理完成，result 可用
    Completed,
    /// 推理失败，error 可用
    Failed,
    /// 被新请求取代或显式取消
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "completed" => Some(TaskStatus::Completed),
            "failed" => Some(TaskStatus::Failed),
            "cancelled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

/// 推荐任务
///
/// 不变量:
/// - task_id 创建后不可变
/// - result 仅在 Completed 时存在，error 仅在 Failed 时存在
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendTask {
    pub task_id: String,
    pub session_id: String,
    pub status: TaskStatus,
    pub input: Vec<BehaviorRecord>,
    pub result: Option<Vec<RecommendedProduct>>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecommendTask {
    pub fn new(session_id: String, input: Vec<BehaviorRecord>) -> Self {
        let now = Utc::now();
        Self {
            task_id: Uuid::new_v4().to_string(),
            session_id,
            status: TaskStatus::Pending,
            input,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 迁移到 Completed 并携带结果
    pub fn complete(&mut self, result: Vec<RecommendedProduct>) {
        self.status = TaskStatus::Completed;
        self.result = Some(result);
        self.error = None;
        self.updated_at = Utc::now();
    }

    /// 迁移到 Failed 并记录错误
    pub fn fail(&mut self, error: String) {
        self.status = TaskStatus::Failed;
        self.error = Some(error);
        self.result = None;
        self.updated_at = Utc::now();
    }

    /// 迁移到 Cancelled
    pub fn cancel(&mut self) {
        self.status = TaskStatus::Cancelled;
        self.updated_at = Utc::now();
    }
}

/// Task Store Port
///
/// 持久化任务记录，进程重启后仍可查询
#[async_trait]
pub trait TaskStorePort: Send + Sync {
    /// 幂等写入任务（按 task_id 插入或整体覆盖）
    async fn put(&self, task: &RecommendTask) -> Result<(), TaskStoreError>;

    /// 仅当存储中的记录仍为 pending 时写入终态
    ///
    /// 条件更新必须在存储层原子执行，worker 的 finalize 与并发
    /// submit 的取代写之间没有其他互斥手段。
    /// 返回 false 表示记录已处于终态，本次写入被丢弃
    async fn put_terminal(&self, task: &RecommendTask) -> Result<bool, TaskStoreError>;

    /// 按 task_id 查询任务
    async fn find_by_id(&self, task_id: &str) -> Result<Option<RecommendTask>, TaskStoreError>;

    /// 查询会话最近创建的任务
    async fn find_current(
        &self,
        session_id: &str,
    ) -> Result<Option<RecommendTask>, TaskStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::behavior::EventType;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::Completed,
            TaskStatus::Failed,
            TaskStatus::Cancelled,
        ] {
            assert_eq!(TaskStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::from_str("running"), None);
    }

    #[test]
    fn test_only_pending_is_non_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_new_task_is_pending() {
        let task = RecommendTask::new(
            "session-1".to_string(),
            vec![BehaviorRecord::new("ShoeA", EventType::ItemView)],
        );
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.result.is_none());
        assert!(task.error.is_none());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_result_and_error_are_exclusive() {
        let mut task = RecommendTask::new(
            "session-1".to_string(),
            vec![BehaviorRecord::new("ShoeA", EventType::ItemView)],
        );

        task.fail("scoring error".to_string());
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.result.is_none());

        task.complete(vec![]);
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.error.is_none());
    }
}
