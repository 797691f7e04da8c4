//! HTTP Routes
//!
//! API 路由定义
//!
//! API Endpoints:
//! - /api/ping              GET   健康检查
//! - /api/recommend/submit  POST  提交推荐任务
//! - /api/recommend/status  POST  查询会话当前任务
//! - /api/recommend/task    POST  按 ID 查询任务

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/recommend", recommend_routes())
}

/// Recommend 路由
fn recommend_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/submit", post(handlers::submit_recommend))
        .route("/status", post(handlers::session_status))
        .route("/task", post(handlers::get_task))
}
