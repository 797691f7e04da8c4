//! Command Handlers

mod recommend_handlers;

pub use recommend_handlers::SubmitRecommendHandler;
