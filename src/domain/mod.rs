//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Behavior Context: 用户行为序列
//! - Recommendation Context: 推荐结果

pub mod behavior;
pub mod recommendation;
