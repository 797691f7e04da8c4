//! Recommendation Pipeline - 可取消的三阶段推荐计算
//!
//! Encode -> Score -> Enrich，每个阶段入口都是取消检查点。
//! 流水线是 (输入, 取消句柄) -> 结果 的纯函数，不持有共享可变状态，
//! 终态回调语义由 worker 保证（每个任务恰好上报一次结果）

use std::cmp::Ordering;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    EmbedderPort, ProductLookupPort, ScorerPort, SequenceEncoding,
};
use crate::domain::behavior::BehaviorSequence;
use crate::domain::recommendation::{RankedCandidate, RecommendedProduct};

/// 流水线配置
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 推荐条数上限（top-K）
    pub top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// 流水线结果
///
/// 取消不是错误，是一等终态
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// 推荐完成，按 score 降序
    Completed(Vec<RecommendedProduct>),
    /// 终态失败（编码或打分错误）
    Failed(String),
    /// 在某个检查点观察到取消信号
    Cancelled,
}

/// 推荐流水线
pub struct RecommendPipeline {
    config: PipelineConfig,
    embedder: Arc<dyn EmbedderPort>,
    scorer: Arc<dyn ScorerPort>,
    product_lookup: Arc<dyn ProductLookupPort>,
}

impl RecommendPipeline {
    pub fn new(
        config: PipelineConfig,
        embedder: Arc<dyn EmbedderPort>,
        scorer: Arc<dyn ScorerPort>,
        product_lookup: Arc<dyn ProductLookupPort>,
    ) -> Self {
        Self {
            config,
            embedder,
            scorer,
            product_lookup,
        }
    }

    /// 执行流水线
    ///
    /// 已取消的句柄会在第一个检查点短路，不触碰任何协作方
    pub async fn run(
        &self,
        input: &BehaviorSequence,
        token: &CancellationToken,
    ) -> PipelineOutcome {
        // Checkpoint: Encode 入口
        if token.is_cancelled() {
            tracing::debug!("Pipeline cancelled before encode");
            return PipelineOutcome::Cancelled;
        }

        let encoding = match self.encode(input).await {
            Ok(e) => e,
            Err(msg) => return PipelineOutcome::Failed(msg),
        };

        // Checkpoint: Score 入口
        if token.is_cancelled() {
            tracing::debug!("Pipeline cancelled before score");
            return PipelineOutcome::Cancelled;
        }

        let candidates = match self.score(&encoding).await {
            Ok(c) => c,
            Err(msg) => return PipelineOutcome::Failed(msg),
        };

        // Checkpoint: Enrich 入口（enrich 内部还有逐条检查）
        if token.is_cancelled() {
            tracing::debug!("Pipeline cancelled before enrich");
            return PipelineOutcome::Cancelled;
        }

        let products = match self.enrich(&candidates, token).await {
            Some(p) => p,
            None => return PipelineOutcome::Cancelled,
        };

        // 最终检查点：流水线收尾时已被取代的任务不得上报 Completed
        if token.is_cancelled() {
            tracing::debug!("Pipeline cancelled after enrich, dropping result");
            return PipelineOutcome::Cancelled;
        }

        PipelineOutcome::Completed(products)
    }

    /// Stage 1: Encode - 商品名嵌入 + 事件索引
    async fn encode(&self, input: &BehaviorSequence) -> Result<SequenceEncoding, String> {
        let names = input.item_names();
        let name_vectors = self
            .embedder
            .embed(&names)
            .await
            .map_err(|e| format!("encoding error: {}", e))?;

        if name_vectors.len() != names.len() {
            return Err(format!(
                "encoding error: embedder returned {} vectors for {} names",
                name_vectors.len(),
                names.len()
            ));
        }

        Ok(SequenceEncoding {
            name_vectors,
            event_indices: input.event_indices(),
        })
    }

    /// Stage 2: Score - 打分并截取 top-K
    ///
    /// 降序排列，同分按商品名升序保证确定性
    async fn score(&self, encoding: &SequenceEncoding) -> Result<Vec<RankedCandidate>, String> {
        let mut candidates = self
            .scorer
            .score(encoding)
            .await
            .map_err(|e| format!("scoring error: {}", e))?;

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.item_name.cmp(&b.item_name))
        });
        candidates.truncate(self.config.top_k);

        Ok(candidates)
    }

    /// Stage 3: Enrich - 逐候选查询报价
    ///
    /// 单条查询失败或无结果时跳过该候选，任务不失败；
    /// 每条查询前检查取消信号，返回 None 表示被取消
    async fn enrich(
        &self,
        candidates: &[RankedCandidate],
        token: &CancellationToken,
    ) -> Option<Vec<RecommendedProduct>> {
        let mut products = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            if token.is_cancelled() {
                tracing::debug!(
                    item_name = %candidate.item_name,
                    "Pipeline cancelled during enrich"
                );
                return None;
            }

            match self.product_lookup.search(&candidate.item_name).await {
                Ok(Some(offer)) => {
                    products.push(RecommendedProduct::from_offer(candidate, offer));
                }
                Ok(None) => {
                    tracing::debug!(
                        item_name = %candidate.item_name,
                        "No offer found, dropping candidate"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        item_name = %candidate.item_name,
                        error = %e,
                        "Product lookup failed, dropping candidate"
                    );
                }
            }
        }

        Some(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::behavior::{BehaviorRecord, EventType};
    use crate::infrastructure::adapters::{FakeModelClient, FakeShoppingClient};

    fn sequence() -> BehaviorSequence {
        BehaviorSequence::new(
            vec![
                BehaviorRecord::new("ShoeA", EventType::ItemView),
                BehaviorRecord::new("ShoeA", EventType::BuyStart),
            ],
            40,
        )
        .unwrap()
    }

    fn pipeline_with(
        model: Arc<FakeModelClient>,
        shopping: Arc<FakeShoppingClient>,
        top_k: usize,
    ) -> RecommendPipeline {
        RecommendPipeline::new(
            PipelineConfig { top_k },
            model.clone(),
            model,
            shopping,
        )
    }

    #[tokio::test]
    async fn test_completed_result_sorted_by_descending_score() {
        let model = Arc::new(FakeModelClient::with_candidates(vec![
            RankedCandidate::new("Bag", 0.3),
            RankedCandidate::new("Shoe", 0.9),
            RankedCandidate::new("Hat", 0.6),
        ]));
        let shopping = Arc::new(FakeShoppingClient::always_found());
        let pipeline = pipeline_with(model, shopping, 5);

        let outcome = pipeline.run(&sequence(), &CancellationToken::new()).await;
        let products = match outcome {
            PipelineOutcome::Completed(p) => p,
            other => panic!("expected Completed, got {:?}", other),
        };

        let scores: Vec<f32> = products.iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![0.9, 0.6, 0.3]);
    }

    #[tokio::test]
    async fn test_top_k_truncation_with_name_tie_break() {
        let model = Arc::new(FakeModelClient::with_candidates(vec![
            RankedCandidate::new("B-item", 0.5),
            RankedCandidate::new("A-item", 0.5),
            RankedCandidate::new("C-item", 0.1),
        ]));
        let shopping = Arc::new(FakeShoppingClient::always_found());
        let pipeline = pipeline_with(model, shopping, 2);

        let outcome = pipeline.run(&sequence(), &CancellationToken::new()).await;
        let products = match outcome {
            PipelineOutcome::Completed(p) => p,
            other => panic!("expected Completed, got {:?}", other),
        };

        // 同分时按名称升序，A-item 排在 B-item 前
        assert_eq!(products.len(), 2);
        assert!(products[0].name.starts_with("A-item"));
        assert!(products[1].name.starts_with("B-item"));
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_short_circuits() {
        let model = Arc::new(FakeModelClient::with_candidates(vec![
            RankedCandidate::new("Shoe", 0.9),
        ]));
        let shopping = Arc::new(FakeShoppingClient::always_found());
        let pipeline = pipeline_with(model.clone(), shopping.clone(), 5);

        let token = CancellationToken::new();
        token.cancel();

        let outcome = pipeline.run(&sequence(), &token).await;
        assert_eq!(outcome, PipelineOutcome::Cancelled);
        // 已取消的句柄不得触碰任何协作方
        assert_eq!(model.embed_calls(), 0);
        assert_eq!(model.score_calls(), 0);
        assert_eq!(shopping.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_embed_failure_yields_encoding_error() {
        let model = Arc::new(FakeModelClient::failing_embed("model server down"));
        let shopping = Arc::new(FakeShoppingClient::always_found());
        let pipeline = pipeline_with(model, shopping, 5);

        let outcome = pipeline.run(&sequence(), &CancellationToken::new()).await;
        match outcome {
            PipelineOutcome::Failed(msg) => assert!(msg.starts_with("encoding error")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_score_failure_yields_scoring_error() {
        let model = Arc::new(FakeModelClient::failing_score("weights missing"));
        let shopping = Arc::new(FakeShoppingClient::always_found());
        let pipeline = pipeline_with(model, shopping, 5);

        let outcome = pipeline.run(&sequence(), &CancellationToken::new()).await;
        match outcome {
            PipelineOutcome::Failed(msg) => assert!(msg.starts_with("scoring error")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_enrichment_miss_drops_item_but_completes() {
        let model = Arc::new(FakeModelClient::with_candidates(vec![
            RankedCandidate::new("Found", 0.9),
            RankedCandidate::new("Missing", 0.8),
            RankedCandidate::new("Broken", 0.7),
        ]));
        let shopping = Arc::new(
            FakeShoppingClient::always_found()
                .with_missing("Missing")
                .with_failing("Broken"),
        );
        let pipeline = pipeline_with(model, shopping, 5);

        let outcome = pipeline.run(&sequence(), &CancellationToken::new()).await;
        let products = match outcome {
            PipelineOutcome::Completed(p) => p,
            other => panic!("expected Completed, got {:?}", other),
        };

        assert_eq!(products.len(), 1);
        assert!(products[0].name.starts_with("Found"));
    }

    #[tokio::test]
    async fn test_all_enrichment_misses_still_completes_empty() {
        let model = Arc::new(FakeModelClient::with_candidates(vec![
            RankedCandidate::new("Missing", 0.9),
        ]));
        let shopping = Arc::new(FakeShoppingClient::always_found().with_missing("Missing"));
        let pipeline = pipeline_with(model, shopping, 5);

        let outcome = pipeline.run(&sequence(), &CancellationToken::new()).await;
        assert_eq!(outcome, PipelineOutcome::Completed(vec![]));
    }
}
