//! Behavior Context - Value Objects

use serde::{Deserialize, Serialize};

use super::errors::BehaviorError;

/// 用户行为事件类型
///
/// 封闭枚举，与模型训练时的事件词表一致，
/// 事件索引（1..=6）作为模型的事件特征输入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// 商品浏览
    ItemView,
    /// 点赞
    ItemLike,
    /// 加入购物车
    ItemAddToCartTap,
    /// 出价
    OfferMake,
    /// 开始购买
    BuyStart,
    /// 完成购买
    BuyComp,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ItemView => "item_view",
            EventType::ItemLike => "item_like",
            EventType::ItemAddToCartTap => "item_add_to_cart_tap",
            EventType::OfferMake => "offer_make",
            EventType::BuyStart => "buy_start",
            EventType::BuyComp => "buy_comp",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "item_view" => Some(EventType::ItemView),
            "item_like" => Some(EventType::ItemLike),
            "item_add_to_cart_tap" => Some(EventType::ItemAddToCartTap),
            "offer_make" => Some(EventType::OfferMake),
            "buy_start" => Some(EventType::BuyStart),
            "buy_comp" => Some(EventType::BuyComp),
            _ => None,
        }
    }

    /// 模型事件特征索引（0 保留给 padding）
    pub fn index(&self) -> u32 {
        match self {
            EventType::ItemView => 1,
            EventType::ItemLike => 2,
            EventType::ItemAddToCartTap => 3,
            EventType::OfferMake => 4,
            EventType::BuyStart => 5,
            EventType::BuyComp => 6,
        }
    }
}

/// 单条行为记录 - (商品名, 事件) 对
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorRecord {
    /// 商品名称
    pub name: String,
    /// 事件类型
    pub event: EventType,
}

impl BehaviorRecord {
    pub fn new(name: impl Into<String>, event: EventType) -> Self {
        Self {
            name: name.into(),
            event,
        }
    }
}

/// 行为序列 - 按时间排序的行为记录
///
/// 不变量:
/// - 非空
/// - 记录顺序即模型输入顺序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorSequence(Vec<BehaviorRecord>);

impl BehaviorSequence {
    /// 构建行为序列，超过 max_len 时只保留最近的记录
    pub fn new(records: Vec<BehaviorRecord>, max_len: usize) -> Result<Self, BehaviorError> {
        if records.is_empty() {
            return Err(BehaviorError::EmptySequence);
        }
        if let Some(record) = records.iter().find(|r| r.name.trim().is_empty()) {
            return Err(BehaviorError::EmptyItemName {
                event: record.event.as_str(),
            });
        }

        let records = if max_len > 0 && records.len() > max_len {
            records[records.len() - max_len..].to_vec()
        } else {
            records
        };

        Ok(Self(records))
    }

    pub fn records(&self) -> &[BehaviorRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 序列中的商品名（模型文本输入）
    pub fn item_names(&self) -> Vec<String> {
        self.0.iter().map(|r| r.name.clone()).collect()
    }

    /// 序列中的事件索引（模型事件特征输入）
    pub fn event_indices(&self) -> Vec<u32> {
        self.0.iter().map(|r| r.event.index()).collect()
    }
}
