//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::ports::RecommendTask;
use crate::domain::recommendation::RecommendedProduct;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Recommend DTOs
// ============================================================================

/// 行为记录 DTO - event 为字符串形式的封闭词表
#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorRecordDto {
    pub name: String,
    pub event: String,
}

/// 推荐条目 DTO
#[derive(Debug, Serialize)]
pub struct ProductDto {
    pub name: String,
    pub score: f32,
    pub price: String,
    pub seller: String,
    pub image: String,
}

impl From<&RecommendedProduct> for ProductDto {
    fn from(p: &RecommendedProduct) -> Self {
        Self {
            name: p.name.clone(),
            score: p.score,
            price: p.price.clone(),
            seller: p.seller.clone(),
            image: p.image.clone(),
        }
    }
}

/// 任务 DTO - 轮询响应的完整任务视图
#[derive(Debug, Serialize)]
pub struct TaskDto {
    pub task_id: String,
    pub session_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<ProductDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&RecommendTask> for TaskDto {
    fn from(task: &RecommendTask) -> Self {
        Self {
            task_id: task.task_id.clone(),
            session_id: task.session_id.clone(),
            status: task.status.as_str().to_string(),
            data: task
                .result
                .as_ref()
                .map(|products| products.iter().map(ProductDto::from).collect()),
            error: task.error.clone(),
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::behavior::{BehaviorRecord, EventType};

    #[test]
    fn test_pending_task_dto_hides_result_and_error() {
        let task = RecommendTask::new(
            "u1".to_string(),
            vec![BehaviorRecord::new("ShoeA", EventType::ItemView)],
        );
        let dto = TaskDto::from(&task);

        assert_eq!(dto.status, "pending");
        assert!(dto.data.is_none());
        assert!(dto.error.is_none());

        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("data").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_completed_task_dto_carries_data() {
        let mut task = RecommendTask::new(
            "u1".to_string(),
            vec![BehaviorRecord::new("ShoeA", EventType::ItemView)],
        );
        task.complete(vec![RecommendedProduct {
            name: "ShoeB".to_string(),
            score: 0.8,
            price: "¥2,000".to_string(),
            seller: "shop-b".to_string(),
            image: String::new(),
        }]);

        let dto = TaskDto::from(&task);
        assert_eq!(dto.status, "completed");
        assert_eq!(dto.data.as_ref().unwrap().len(), 1);
    }
}
