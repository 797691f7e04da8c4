//! Behavior Context - 用户行为限界上下文
//!
//! 职责:
//! - 行为事件词表
//! - 行为序列的构建与校验

mod errors;
mod value_objects;

pub use errors::BehaviorError;
pub use value_objects::{BehaviorRecord, BehaviorSequence, EventType};
