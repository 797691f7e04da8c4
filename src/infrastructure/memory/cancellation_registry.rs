//! In-Memory Cancellation Registry Implementation

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::application::ports::CancellationRegistryPort;

/// 内存取消注册表
///
/// session_id -> 当前存活的 CancellationToken。
/// 显式注入生命周期，测试可为每个用例构造独立实例
pub struct InMemoryCancellationRegistry {
    tokens: DashMap<String, CancellationToken>,
}

impl InMemoryCancellationRegistry {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
        }
    }
}

impl Default for InMemoryCancellationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationRegistryPort for InMemoryCancellationRegistry {
    fn register(&self, session_id: &str) -> CancellationToken {
        let token = CancellationToken::new();

        if let Some(old) = self.tokens.insert(session_id.to_string(), token.clone()) {
            old.cancel();
            tracing::debug!(session_id = %session_id, "Previous handle cancelled on register");
        }

        tracing::debug!(session_id = %session_id, "Cancellation handle registered");
        token
    }

    fn cancel(&self, session_id: &str) {
        // 对不存在或已取消的会话是 no-op
        if let Some((_, token)) = self.tokens.remove(session_id) {
            token.cancel();
            tracing::debug!(session_id = %session_id, "Session cancelled");
        }
    }

    fn is_registered(&self, session_id: &str) -> bool {
        self.tokens.contains_key(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_returns_live_token() {
        let registry = InMemoryCancellationRegistry::new();
        let token = registry.register("session-1");
        assert!(!token.is_cancelled());
        assert!(registry.is_registered("session-1"));
    }

    #[test]
    fn test_register_supersedes_and_signals_old_handle() {
        let registry = InMemoryCancellationRegistry::new();

        let first = registry.register("session-1");
        let second = registry.register("session-1");

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn test_cancel_signals_and_removes() {
        let registry = InMemoryCancellationRegistry::new();
        let token = registry.register("session-1");

        registry.cancel("session-1");
        assert!(token.is_cancelled());
        assert!(!registry.is_registered("session-1"));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let registry = InMemoryCancellationRegistry::new();
        registry.register("session-1");

        registry.cancel("session-1");
        registry.cancel("session-1");
        registry.cancel("never-registered");
    }

    #[test]
    fn test_sessions_have_independent_handles() {
        let registry = InMemoryCancellationRegistry::new();
        let a = registry.register("session-a");
        let b = registry.register("session-b");

        registry.cancel("session-a");
        assert!(a.is_cancelled());
        assert!(!b.is_cancelled());
    }
}
