//! Behavior Context - 领域错误

use thiserror::Error;

/// 行为序列校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BehaviorError {
    #[error("Behavior sequence cannot be empty")]
    EmptySequence,

    #[error("Item name cannot be blank (event: {event})")]
    EmptyItemName { event: &'static str },

    #[error("Unknown event type: {0}")]
    UnknownEvent(String),
}
