//! Recommend Commands - 推荐任务相关命令

use tokio_util::sync::CancellationToken;

use crate::application::ports::TaskStatus;
use crate::domain::behavior::BehaviorRecord;

/// 提交推荐请求命令
#[derive(Debug, Clone)]
pub struct SubmitRecommendCommand {
    /// 会话标识（外部不透明字符串）
    pub session_id: String,
    /// 按时间排序的行为序列
    pub behaviors: Vec<BehaviorRecord>,
}

/// 提交推荐请求响应
#[derive(Debug, Clone)]
pub struct SubmitRecommendResponse {
    pub task_id: String,
    pub status: TaskStatus,
}

/// 流水线作业 - 通过任务队列交给 worker 执行
///
/// 取消句柄在 submit 时绑定；worker 不回查注册表，
/// 否则新请求注册的新句柄会被误绑到旧任务上
#[derive(Debug, Clone)]
pub struct PipelineJob {
    pub task_id: String,
    pub session_id: String,
    pub token: CancellationToken,
}
