//! Rec Worker - Background Recommendation Task Processor

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::application::commands::PipelineJob;
use crate::application::pipeline::{PipelineOutcome, RecommendPipeline};
use crate::application::ports::{RecommendTask, TaskStorePort};
use crate::domain::behavior::BehaviorSequence;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct RecWorkerConfig {
    /// 最大并发流水线数
    pub max_concurrent: usize,
    /// 终态写入失败的最大重试次数
    pub store_max_retries: u32,
    /// 重试退避基准时长（毫秒），按尝试次数指数增长
    pub store_retry_base_ms: u64,
}

impl Default for RecWorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            store_max_retries: 3,
            store_retry_base_ms: 100,
        }
    }
}

/// 推荐 Worker
///
/// 后台任务处理器，从队列消费作业并执行推荐流水线。
/// 终态写入是任务结果的唯一写路径，每个作业恰好上报一次
pub struct RecWorker {
    config: RecWorkerConfig,
    job_receiver: mpsc::Receiver<PipelineJob>,
    task_store: Arc<dyn TaskStorePort>,
    pipeline: Arc<RecommendPipeline>,
}

impl RecWorker {
    pub fn new(
        config: RecWorkerConfig,
        job_receiver: mpsc::Receiver<PipelineJob>,
        task_store: Arc<dyn TaskStorePort>,
        pipeline: Arc<RecommendPipeline>,
    ) -> Self {
        Self {
            config,
            job_receiver,
            task_store,
            pipeline,
        }
    }

    /// 启动 Worker
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            "RecWorker started"
        );

        // 使用 semaphore 控制并发
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.max_concurrent));

        while let Some(job) = self.job_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => {
                    tracing::error!("Failed to acquire semaphore permit");
                    continue;
                }
            };

            let task_store = self.task_store.clone();
            let pipeline = self.pipeline.clone();
            let config = self.config.clone();

            tokio::spawn(async move {
                let _permit = permit; // 持有 permit 直到任务完成

                Self::process_job(job, task_store, pipeline, &config).await;
            });
        }

        tracing::info!("RecWorker stopped");
    }

    /// 处理单个作业
    async fn process_job(
        job: PipelineJob,
        task_store: Arc<dyn TaskStorePort>,
        pipeline: Arc<RecommendPipeline>,
        config: &RecWorkerConfig,
    ) {
        // 获取任务记录
        let task = match task_store.find_by_id(&job.task_id).await {
            Ok(Some(t)) => t,
            Ok(None) => {
                tracing::warn!(task_id = %job.task_id, "Task not found, skipping");
                return;
            }
            Err(e) => {
                tracing::error!(task_id = %job.task_id, error = %e, "Failed to load task");
                return;
            }
        };

        // 已被新 submit 标记为终态的记录不再处理
        if task.status.is_terminal() {
            tracing::debug!(
                task_id = %job.task_id,
                status = task.status.as_str(),
                "Task already terminal, skipping"
            );
            return;
        }

        // 入队到开跑之间就被取代的作业直接落取消终态
        if job.token.is_cancelled() {
            tracing::debug!(task_id = %job.task_id, "Job cancelled before start");
            Self::finalize(&job, PipelineOutcome::Cancelled, &task_store, config).await;
            return;
        }

        // 输入在 submit 阶段已校验；0 表示不再截断
        let sequence = match BehaviorSequence::new(task.input.clone(), 0) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(task_id = %job.task_id, error = %e, "Stored input invalid");
                Self::finalize(
                    &job,
                    PipelineOutcome::Failed(format!("invalid input: {}", e)),
                    &task_store,
                    config,
                )
                .await;
                return;
            }
        };

        let outcome = pipeline.run(&sequence, &job.token).await;
        Self::finalize(&job, outcome, &task_store, config).await;
    }

    /// 终态落库
    ///
    /// 状态迁移单调性由存储层的条件更新保证：
    /// 被新 submit 抢先标记 cancelled 的过期回调是 no-op
    async fn finalize(
        job: &PipelineJob,
        outcome: PipelineOutcome,
        task_store: &Arc<dyn TaskStorePort>,
        config: &RecWorkerConfig,
    ) {
        let mut task = match task_store.find_by_id(&job.task_id).await {
            Ok(Some(t)) => t,
            Ok(None) => {
                tracing::warn!(task_id = %job.task_id, "Task vanished before finalize");
                return;
            }
            Err(e) => {
                tracing::error!(task_id = %job.task_id, error = %e, "Failed to reload task");
                return;
            }
        };

        // 流水线收尾与新 submit 竞争时以取消为准
        let outcome = if job.token.is_cancelled() {
            PipelineOutcome::Cancelled
        } else {
            outcome
        };

        match outcome {
            PipelineOutcome::Completed(products) => {
                tracing::info!(
                    task_id = %job.task_id,
                    session_id = %job.session_id,
                    product_count = products.len(),
                    "Task completed"
                );
                task.complete(products);
            }
            PipelineOutcome::Failed(error) => {
                tracing::error!(
                    task_id = %job.task_id,
                    session_id = %job.session_id,
                    error = %error,
                    "Task failed"
                );
                task.fail(error);
            }
            PipelineOutcome::Cancelled => {
                tracing::debug!(
                    task_id = %job.task_id,
                    session_id = %job.session_id,
                    "Task cancelled"
                );
                task.cancel();
            }
        }

        Self::persist_with_retry(task_store, &task, config).await;
    }

    /// 有界指数退避的终态写入
    ///
    /// 走存储层的条件更新：记录已被新 submit 标记为终态时写入被丢弃。
    /// 重试耗尽时结果被丢弃并记录运维告警，任务对客户端永远保持 pending
    async fn persist_with_retry(
        task_store: &Arc<dyn TaskStorePort>,
        task: &RecommendTask,
        config: &RecWorkerConfig,
    ) {
        let mut attempt: u32 = 0;
        loop {
            match task_store.put_terminal(task).await {
                Ok(true) => return,
                Ok(false) => {
                    tracing::debug!(
                        task_id = %task.task_id,
                        status = task.status.as_str(),
                        "Record already terminal, stale write dropped"
                    );
                    return;
                }
                Err(e) if attempt < config.store_max_retries => {
                    let delay = config.store_retry_base_ms * 2u64.pow(attempt);
                    attempt += 1;
                    tracing::warn!(
                        task_id = %task.task_id,
                        error = %e,
                        attempt = attempt,
                        delay_ms = delay,
                        "Terminal state write failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => {
                    tracing::error!(
                        task_id = %task.task_id,
                        status = task.status.as_str(),
                        error = %e,
                        "Terminal state write exhausted retries, result dropped; \
                         task stays pending"
                    );
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::SubmitRecommendCommand;
    use crate::application::pipeline::PipelineConfig;
    use crate::application::ports::{TaskStatus, TaskStoreError};
    use crate::application::SubmitRecommendHandler;
    use async_trait::async_trait;
    use crate::domain::behavior::{BehaviorRecord, EventType};
    use crate::domain::recommendation::RankedCandidate;
    use crate::infrastructure::adapters::{FakeModelClient, FakeShoppingClient};
    use crate::infrastructure::memory::InMemoryCancellationRegistry;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteTaskStore,
    };

    struct Harness {
        handler: SubmitRecommendHandler,
        store: Arc<SqliteTaskStore>,
    }

    async fn harness(model: Arc<FakeModelClient>, shopping: Arc<FakeShoppingClient>) -> Harness {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let store = Arc::new(SqliteTaskStore::new(pool));
        let registry = Arc::new(InMemoryCancellationRegistry::new());
        let (tx, rx) = mpsc::channel(100);

        let pipeline = Arc::new(RecommendPipeline::new(
            PipelineConfig { top_k: 5 },
            model.clone(),
            model,
            shopping,
        ));
        let worker = RecWorker::new(
            RecWorkerConfig::default(),
            rx,
            store.clone(),
            pipeline,
        );
        tokio::spawn(worker.run());

        Harness {
            handler: SubmitRecommendHandler::new(registry, store.clone(), tx, 40),
            store,
        }
    }

    fn command(session_id: &str) -> SubmitRecommendCommand {
        SubmitRecommendCommand {
            session_id: session_id.to_string(),
            behaviors: vec![
                BehaviorRecord::new("ShoeA", EventType::ItemView),
                BehaviorRecord::new("ShoeA", EventType::BuyStart),
            ],
        }
    }

    async fn wait_for_terminal(store: &SqliteTaskStore, task_id: &str) -> RecommendTask {
        for _ in 0..200 {
            let task = store.find_by_id(task_id).await.unwrap().unwrap();
            if task.status.is_terminal() {
                return task;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {} never reached a terminal state", task_id);
    }

    #[tokio::test]
    async fn test_submit_then_poll_reaches_completed_sorted_by_score() {
        let model = Arc::new(FakeModelClient::with_candidates(vec![
            RankedCandidate::new("Bag", 0.3),
            RankedCandidate::new("Shoe", 0.9),
        ]));
        let harness = harness(model, Arc::new(FakeShoppingClient::always_found())).await;

        let response = harness.handler.handle(command("u1")).await.unwrap();
        assert_eq!(response.status, TaskStatus::Pending);

        let task = wait_for_terminal(&harness.store, &response.task_id).await;
        assert_eq!(task.status, TaskStatus::Completed);
        let products = task.result.unwrap();
        assert_eq!(products.len(), 2);
        assert!(products[0].score >= products[1].score);
        assert!(task.error.is_none());
    }

    #[tokio::test]
    async fn test_scoring_failure_reaches_failed() {
        let model = Arc::new(FakeModelClient::failing_score("weights missing"));
        let harness = harness(model, Arc::new(FakeShoppingClient::always_found())).await;

        let response = harness.handler.handle(command("u1")).await.unwrap();
        let task = wait_for_terminal(&harness.store, &response.task_id).await;

        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.unwrap().starts_with("scoring error"));
        assert!(task.result.is_none());
    }

    #[tokio::test]
    async fn test_rapid_double_submit_cancels_first_completes_second() {
        // 慢打分制造取代窗口
        let model = Arc::new(
            FakeModelClient::with_candidates(vec![RankedCandidate::new("Shoe", 0.9)])
                .with_score_delay(Duration::from_millis(200)),
        );
        let harness = harness(model, Arc::new(FakeShoppingClient::always_found())).await;

        let first = harness.handler.handle(command("u1")).await.unwrap();
        let second = harness.handler.handle(command("u1")).await.unwrap();

        let first_task = wait_for_terminal(&harness.store, &first.task_id).await;
        let second_task = wait_for_terminal(&harness.store, &second.task_id).await;

        // 第一个任务永远不能以 completed 收尾
        assert_eq!(first_task.status, TaskStatus::Cancelled);
        assert!(first_task.result.is_none());
        assert_eq!(second_task.status, TaskStatus::Completed);

        // 会话当前任务指向第二个
        let current = harness.store.find_current("u1").await.unwrap().unwrap();
        assert_eq!(current.task_id, second.task_id);
    }

    /// completed 终态写入人为卡顿，放大 finalize 与取代写的竞争窗口
    struct StallingTerminalStore {
        inner: Arc<SqliteTaskStore>,
        delay: Duration,
    }

    #[async_trait]
    impl TaskStorePort for StallingTerminalStore {
        async fn put(&self, task: &RecommendTask) -> Result<(), TaskStoreError> {
            self.inner.put(task).await
        }

        async fn put_terminal(&self, task: &RecommendTask) -> Result<bool, TaskStoreError> {
            if task.status == TaskStatus::Completed {
                tokio::time::sleep(self.delay).await;
            }
            self.inner.put_terminal(task).await
        }

        async fn find_by_id(
            &self,
            task_id: &str,
        ) -> Result<Option<RecommendTask>, TaskStoreError> {
            self.inner.find_by_id(task_id).await
        }

        async fn find_current(
            &self,
            session_id: &str,
        ) -> Result<Option<RecommendTask>, TaskStoreError> {
            self.inner.find_current(session_id).await
        }
    }

    #[tokio::test]
    async fn test_delayed_completed_write_cannot_resurrect_superseded_task() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let sqlite = Arc::new(SqliteTaskStore::new(pool));
        let store: Arc<dyn TaskStorePort> = Arc::new(StallingTerminalStore {
            inner: sqlite.clone(),
            delay: Duration::from_millis(300),
        });

        let model = Arc::new(FakeModelClient::with_candidates(vec![
            RankedCandidate::new("Shoe", 0.9),
        ]));
        let pipeline = Arc::new(RecommendPipeline::new(
            PipelineConfig { top_k: 5 },
            model.clone(),
            model,
            Arc::new(FakeShoppingClient::always_found()),
        ));
        let registry = Arc::new(InMemoryCancellationRegistry::new());
        let (tx, rx) = mpsc::channel(100);
        let worker = RecWorker::new(RecWorkerConfig::default(), rx, store.clone(), pipeline);
        tokio::spawn(worker.run());
        let handler = SubmitRecommendHandler::new(registry, store.clone(), tx, 40);

        // 第一条流水线很快跑完，completed 写入进入卡顿窗口
        let first = handler.handle(command("u1")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        // 卡顿期间第二次 submit 把第一条记录标记为 cancelled
        let second = handler.handle(command("u1")).await.unwrap();
        let superseded = store.find_by_id(&first.task_id).await.unwrap().unwrap();
        assert_eq!(superseded.status, TaskStatus::Cancelled);

        // 卡顿结束后迟到的 completed 写入必须被条件更新拒绝
        tokio::time::sleep(Duration::from_millis(400)).await;
        let first_task = store.find_by_id(&first.task_id).await.unwrap().unwrap();
        assert_eq!(first_task.status, TaskStatus::Cancelled);
        assert!(first_task.result.is_none());

        let second_task = wait_for_terminal(&sqlite, &second.task_id).await;
        assert_eq!(second_task.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_enrichment_miss_still_completes() {
        let model = Arc::new(FakeModelClient::with_candidates(vec![
            RankedCandidate::new("Found", 0.9),
            RankedCandidate::new("Missing", 0.5),
        ]));
        let shopping = Arc::new(FakeShoppingClient::always_found().with_missing("Missing"));
        let harness = harness(model, shopping).await;

        let response = harness.handler.handle(command("u1")).await.unwrap();
        let task = wait_for_terminal(&harness.store, &response.task_id).await;

        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.result.unwrap().len(), 1);
    }
}
