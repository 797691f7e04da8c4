//! SQLite Task Store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{
    RecommendTask, TaskStatus, TaskStoreError, TaskStorePort,
};
use crate::domain::behavior::BehaviorRecord;
use crate::domain::recommendation::RecommendedProduct;

/// SQLite Task Store
///
/// input/result 以 JSON 文本列存储，时间戳为 RFC3339 文本
pub struct SqliteTaskStore {
    pool: DbPool,
}

impl SqliteTaskStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct TaskRow {
    task_id: String,
    session_id: String,
    status: String,
    input: String,
    result: Option<String>,
    error: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<TaskRow> for RecommendTask {
    type Error = TaskStoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let input: Vec<BehaviorRecord> = serde_json::from_str(&row.input)
            .map_err(|e| TaskStoreError::SerializationError(e.to_string()))?;

        let result: Option<Vec<RecommendedProduct>> = row
            .result
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| TaskStoreError::SerializationError(e.to_string()))?;

        let status = TaskStatus::from_str(&row.status).ok_or_else(|| {
            TaskStoreError::SerializationError(format!("unknown task status: {}", row.status))
        })?;

        Ok(RecommendTask {
            task_id: row.task_id,
            session_id: row.session_id,
            status,
            input,
            result,
            error: row.error,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, TaskStoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TaskStoreError::SerializationError(e.to_string()))
}

#[async_trait]
impl TaskStorePort for SqliteTaskStore {
    async fn put(&self, task: &RecommendTask) -> Result<(), TaskStoreError> {
        let input = serde_json::to_string(&task.input)
            .map_err(|e| TaskStoreError::SerializationError(e.to_string()))?;
        let result = task
            .result
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| TaskStoreError::SerializationError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO rec_tasks (task_id, session_id, status, input, result, error, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(task_id) DO UPDATE SET
                session_id = excluded.session_id,
                status = excluded.status,
                input = excluded.input,
                result = excluded.result,
                error = excluded.error,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&task.task_id)
        .bind(&task.session_id)
        .bind(task.status.as_str())
        .bind(input)
        .bind(result)
        .bind(&task.error)
        .bind(task.created_at.to_rfc3339())
        .bind(task.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| TaskStoreError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn put_terminal(&self, task: &RecommendTask) -> Result<bool, TaskStoreError> {
        let result = task
            .result
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| TaskStoreError::SerializationError(e.to_string()))?;

        // 条件更新：status 仍为 pending 才允许迁移，受影响行数为 0 即记录已终态
        let updated = sqlx::query(
            r#"
            UPDATE rec_tasks SET
                status = ?,
                result = ?,
                error = ?,
                updated_at = ?
            WHERE task_id = ? AND status = 'pending'
            "#,
        )
        .bind(task.status.as_str())
        .bind(result)
        .bind(&task.error)
        .bind(task.updated_at.to_rfc3339())
        .bind(&task.task_id)
        .execute(&self.pool)
        .await
        .map_err(|e| TaskStoreError::DatabaseError(e.to_string()))?;

        Ok(updated.rows_affected() > 0)
    }

    async fn find_by_id(&self, task_id: &str) -> Result<Option<RecommendTask>, TaskStoreError> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT task_id, session_id, status, input, result, error, created_at, updated_at \
             FROM rec_tasks WHERE task_id = ?",
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TaskStoreError::DatabaseError(e.to_string()))?;

        row.map(RecommendTask::try_from).transpose()
    }

    async fn find_current(
        &self,
        session_id: &str,
    ) -> Result<Option<RecommendTask>, TaskStoreError> {
        // created_at 是 RFC3339 UTC 文本，字典序即时间序；同刻创建的用 rowid 兜底
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT task_id, session_id, status, input, result, error, created_at, updated_at \
             FROM rec_tasks WHERE session_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TaskStoreError::DatabaseError(e.to_string()))?;

        row.map(RecommendTask::try_from).transpose()
    }
}
