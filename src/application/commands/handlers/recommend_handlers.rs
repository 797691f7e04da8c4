//! Recommend Command Handlers - 任务编排
//!
//! SubmitRecommendHandler 是编排核心：
//! 同一会话的 submit 通过会话级互斥锁串行化，
//! 注册新取消句柄（即作废旧流水线）-> 取代旧 pending 任务 ->
//! 持久化新任务 -> 入队，立即返回 task_id，从不等待流水线

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::application::commands::recommend_commands::{
    PipelineJob, SubmitRecommendCommand, SubmitRecommendResponse,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    CancellationRegistryPort, RecommendTask, TaskStatus, TaskStorePort,
};
use crate::domain::behavior::BehaviorSequence;

/// SubmitRecommend Handler - 提交推荐任务
pub struct SubmitRecommendHandler {
    registry: Arc<dyn CancellationRegistryPort>,
    task_store: Arc<dyn TaskStorePort>,
    job_sender: mpsc::Sender<PipelineJob>,
    /// 会话级互斥锁，保证 register + 取代 + 写入 的原子性
    session_locks: DashMap<String, Arc<Mutex<()>>>,
    max_sequence_len: usize,
}

impl SubmitRecommendHandler {
    pub fn new(
        registry: Arc<dyn CancellationRegistryPort>,
        task_store: Arc<dyn TaskStorePort>,
        job_sender: mpsc::Sender<PipelineJob>,
        max_sequence_len: usize,
    ) -> Self {
        Self {
            registry,
            task_store,
            job_sender,
            session_locks: DashMap::new(),
            max_sequence_len,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitRecommendCommand,
    ) -> Result<SubmitRecommendResponse, ApplicationError> {
        if cmd.session_id.trim().is_empty() {
            return Err(ApplicationError::validation("session_id cannot be empty"));
        }

        // 输入错误在这里同步拒绝，不创建任务
        let sequence = BehaviorSequence::new(cmd.behaviors, self.max_sequence_len)?;

        // 同一会话的 submit 串行化
        let lock = self
            .session_locks
            .entry(cmd.session_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // 注册新句柄：旧流水线在下一个检查点观察到取消
        let token = self.registry.register(&cmd.session_id);

        // 取代仍处于 pending 的旧任务
        if let Some(mut prev) = self.task_store.find_current(&cmd.session_id).await? {
            if prev.status == TaskStatus::Pending {
                prev.cancel();
                self.task_store.put(&prev).await?;
                tracing::info!(
                    session_id = %cmd.session_id,
                    superseded_task_id = %prev.task_id,
                    "Previous pending task superseded"
                );
            }
        }

        // 创建并持久化新任务
        let task = RecommendTask::new(cmd.session_id.clone(), sequence.records().to_vec());
        self.task_store.put(&task).await?;

        // 入队，句柄在此绑定到新任务
        let job = PipelineJob {
            task_id: task.task_id.clone(),
            session_id: cmd.session_id.clone(),
            token,
        };
        if let Err(e) = self.job_sender.try_send(job) {
            tracing::warn!(
                task_id = %task.task_id,
                error = %e,
                "Failed to enqueue pipeline job, task stays pending"
            );
        }

        tracing::debug!(
            session_id = %cmd.session_id,
            task_id = %task.task_id,
            sequence_len = sequence.len(),
            "Recommendation task submitted"
        );

        Ok(SubmitRecommendResponse {
            task_id: task.task_id,
            status: TaskStatus::Pending,
        })
    }
}
