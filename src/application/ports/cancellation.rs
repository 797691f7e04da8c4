//! Cancellation Registry Port - 会话级取消信号
//!
//! 每个会话同一时刻只有一个存活的取消句柄；
//! 重新注册会先向旧句柄发出取消信号再替换

use tokio_util::sync::CancellationToken;

/// Cancellation Registry Port
///
/// 管理会话当前运行流水线的取消句柄。
/// 取消为协作式：流水线在各阶段入口检查 `token.is_cancelled()`
pub trait CancellationRegistryPort: Send + Sync {
    /// 为会话注册一个新句柄，取消并替换旧句柄
    fn register(&self, session_id: &str) -> CancellationToken;

    /// 取消会话当前句柄并将其移出注册表；对不存在的会话为 no-op
    fn cancel(&self, session_id: &str);

    /// 会话当前是否有注册的句柄
    fn is_registered(&self, session_id: &str) -> bool;
}
