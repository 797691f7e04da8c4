//! Recommend Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{GetSessionTaskQuery, GetTaskQuery, SubmitRecommendCommand};
use crate::domain::behavior::{BehaviorError, BehaviorRecord, EventType};
use crate::infrastructure::http::dto::{ApiResponse, BehaviorRecordDto, TaskDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Submit Recommendation
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitRecommendRequest {
    pub session_id: String,
    pub behaviors: Vec<BehaviorRecordDto>,
}

#[derive(Debug, Serialize)]
pub struct SubmitRecommendResponseDto {
    pub task_id: String,
    pub status: String,
}

pub async fn submit_recommend(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitRecommendRequest>,
) -> Result<Json<ApiResponse<SubmitRecommendResponseDto>>, ApiError> {
    // 事件词表封闭，未知事件同步拒绝
    let behaviors = req
        .behaviors
        .into_iter()
        .map(|dto| {
            EventType::from_str(&dto.event)
                .map(|event| BehaviorRecord::new(dto.name, event))
                .ok_or_else(|| BehaviorError::UnknownEvent(dto.event))
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let cmd = SubmitRecommendCommand {
        session_id: req.session_id,
        behaviors,
    };

    let result = state.submit_recommend_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(SubmitRecommendResponseDto {
        task_id: result.task_id,
        status: result.status.as_str().to_string(),
    })))
}

// ============================================================================
// Poll Session Status
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SessionStatusRequest {
    pub session_id: String,
}

pub async fn session_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionStatusRequest>,
) -> Result<Json<ApiResponse<TaskDto>>, ApiError> {
    let task = state
        .get_session_task_handler
        .handle(GetSessionTaskQuery {
            session_id: req.session_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(TaskDto::from(&task))))
}

// ============================================================================
// Get Task By Id
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GetTaskRequest {
    pub task_id: String,
}

pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetTaskRequest>,
) -> Result<Json<ApiResponse<TaskDto>>, ApiError> {
    let task = state
        .get_task_handler
        .handle(GetTaskQuery {
            task_id: req.task_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(TaskDto::from(&task))))
}
