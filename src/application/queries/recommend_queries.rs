//! Recommend Queries - 任务状态查询

/// 查询会话当前任务
#[derive(Debug, Clone)]
pub struct GetSessionTaskQuery {
    pub session_id: String,
}

/// 按 task_id 查询任务
#[derive(Debug, Clone)]
pub struct GetTaskQuery {
    pub task_id: String,
}
