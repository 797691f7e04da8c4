//! Recommendation Context - Value Objects

use serde::{Deserialize, Serialize};

/// 打分候选 - 打分模型输出的 (商品名, 分数) 对
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// 候选商品名
    pub item_name: String,
    /// 模型分数
    pub score: f32,
}

impl RankedCandidate {
    pub fn new(item_name: impl Into<String>, score: f32) -> Self {
        Self {
            item_name: item_name.into(),
            score,
        }
    }
}

/// 商品报价 - 价格查询服务返回的商品信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOffer {
    /// 商品名称
    pub name: String,
    /// 价格（展示用原始字符串，如 "¥1,200"）
    pub price: String,
    /// 卖家
    pub seller: String,
    /// 商品图片 URL
    pub image: String,
}

/// 推荐条目 - 候选与报价合并后的最终结果
///
/// 不变量: 结果列表按 score 降序排列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProduct {
    /// 商品名称（报价侧名称）
    pub name: String,
    /// 模型分数
    pub score: f32,
    /// 价格
    pub price: String,
    /// 卖家
    pub seller: String,
    /// 商品图片 URL
    pub image: String,
}

impl RecommendedProduct {
    /// 合并候选分数与商品报价
    pub fn from_offer(candidate: &RankedCandidate, offer: ProductOffer) -> Self {
        Self {
            name: offer.name,
            score: candidate.score,
            price: offer.price,
            seller: offer.seller,
            image: offer.image,
        }
    }
}
