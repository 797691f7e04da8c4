//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod model;
pub mod shopping;

pub use model::*;
pub use shopping::*;
