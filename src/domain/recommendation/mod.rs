//! Recommendation Context - 推荐限界上下文
//!
//! 职责:
//! - 打分候选与最终推荐条目
//! - 商品报价值对象

mod value_objects;

pub use value_objects::{ProductOffer, RankedCandidate, RecommendedProduct};
