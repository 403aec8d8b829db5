//! Enrichment orchestrator - runs all analyzers for one article

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::domain::article::validate_article;
use crate::domain::{
    AnalysisOptions, AnalysisResult, AnalyzerKind, AnalyzerResult, Article, CostSummary,
    DomainError, ScoreWeights,
};
use crate::infrastructure::analyzers::{AnalysisPipeline, AnalyzerRegistry};

/// Produces the aggregated annotations of an article
#[derive(Debug)]
pub struct EnrichmentOrchestrator {
    pipeline: Arc<AnalysisPipeline>,
    registry: AnalyzerRegistry,
    weights: ScoreWeights,
}

impl EnrichmentOrchestrator {
    /// Create an orchestrator with the built-in analyzers and default weights
    pub fn new(pipeline: Arc<AnalysisPipeline>) -> Self {
        Self {
            pipeline,
            registry: AnalyzerRegistry::standard(),
            weights: ScoreWeights::default(),
        }
    }

    pub fn with_registry(mut self, registry: AnalyzerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights.normalized();
        self
    }

    pub fn pipeline(&self) -> &Arc<AnalysisPipeline> {
        &self.pipeline
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Spend recorded by every external call made so far
    pub fn cost_summary(&self) -> CostSummary {
        self.pipeline.ledger().summary()
    }

    /// Analyze an article, taking source and publication time from its metadata
    pub async fn analyze(
        &self,
        article: &Article,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, DomainError> {
        self.analyze_article(&article.id, &article.content, &options.for_article(article))
            .await
    }

    /// Run the four analyzers concurrently and combine their results
    ///
    /// Fails only on invalid input or a missing analyzer; an analyzer whose
    /// paths both failed leaves its slot empty and is listed in `degraded`.
    #[instrument(skip(self, content, options), fields(article_id = %id))]
    pub async fn analyze_article(
        &self,
        id: &str,
        content: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, DomainError> {
        validate_article(id, content)?;

        let started = Instant::now();

        let sentiment = self.registry.require(AnalyzerKind::Sentiment)?;
        let topic = self.registry.require(AnalyzerKind::Topic)?;
        let summary = self.registry.require(AnalyzerKind::Summary)?;
        let relevance = self.registry.require(AnalyzerKind::Relevance)?;

        let (sentiment, topic, summary, relevance) = tokio::join!(
            self.pipeline.analyze(sentiment.as_ref(), content, options),
            self.pipeline.analyze(topic.as_ref(), content, options),
            self.pipeline.analyze(summary.as_ref(), content, options),
            self.pipeline.analyze(relevance.as_ref(), content, options),
        );

        let mut degraded = BTreeMap::new();
        let sentiment = settle(AnalyzerKind::Sentiment, sentiment, &mut degraded);
        let topic = settle(AnalyzerKind::Topic, topic, &mut degraded);
        let summary = settle(AnalyzerKind::Summary, summary, &mut degraded);
        let relevance = settle(AnalyzerKind::Relevance, relevance, &mut degraded);

        let produced = [&sentiment, &topic, &summary, &relevance];
        let combined_score = self.weights.combine(
            produced
                .iter()
                .filter_map(|r| r.as_ref())
                .map(|r| (r.kind(), r.payload.score_component())),
        );
        let total_cost = produced
            .iter()
            .filter_map(|r| r.as_ref())
            .map(|r| r.cost)
            .sum();

        let result = AnalysisResult {
            article_id: id.to_string(),
            sentiment,
            topic,
            summary,
            relevance,
            combined_score,
            total_cost,
            processing_time: started.elapsed(),
            degraded,
        };

        debug!(
            combined_score = result.combined_score,
            total_cost = result.total_cost,
            degraded = result.degraded.len(),
            "Article analyzed"
        );

        Ok(result)
    }
}

fn settle(
    kind: AnalyzerKind,
    result: Result<AnalyzerResult, DomainError>,
    degraded: &mut BTreeMap<AnalyzerKind, String>,
) -> Option<AnalyzerResult> {
    match result {
        Ok(result) => Some(result),
        Err(e) => {
            warn!(kind = %kind, error = %e, "Analyzer degraded");
            degraded.insert(kind, e.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::cache::Cache;
    use crate::domain::inference::ScriptedInferenceClient;
    use crate::domain::{CostModel, InferenceClient, InferenceError, SentimentLabel};
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::resilience::{RateLimiter, RetryController, RetryPolicy, WindowLimit};

    /// A response every analyzer accepts
    const UNIVERSAL_JSON: &str = r#"{
        "score": 0.5, "confidence": 0.8,
        "primary": "technology", "secondary": [],
        "summary": "A short summary.", "quality": 0.7,
        "relevance": 0.6, "reason": "matches interests"
    }"#;

    const WINDOW: Duration = Duration::from_secs(60);

    struct Harness {
        orchestrator: EnrichmentOrchestrator,
        client: Arc<ScriptedInferenceClient>,
        cache: Arc<InMemoryCache>,
        limiter: Arc<RateLimiter>,
    }

    fn harness(client: ScriptedInferenceClient) -> Harness {
        let client = Arc::new(client);
        let cache = Arc::new(InMemoryCache::new());
        let limiter = Arc::new(RateLimiter::with_windows(vec![WindowLimit::new(WINDOW, 1000)]));
        let dyn_client: Arc<dyn InferenceClient> = client.clone();

        let pipeline = AnalysisPipeline::new(
            cache.clone(),
            limiter.clone(),
            RetryController::new(RetryPolicy::new(
                3,
                Duration::from_millis(10),
                Duration::from_millis(50),
            )),
            Arc::new(CostModel::default()),
        )
        .with_client(Some(dyn_client));

        Harness {
            orchestrator: EnrichmentOrchestrator::new(Arc::new(pipeline)),
            client,
            cache,
            limiter,
        }
    }

    #[tokio::test]
    async fn test_positive_article_without_external_inference() {
        let h = harness(ScriptedInferenceClient::new().always_text(UNIVERSAL_JSON));

        let result = h
            .orchestrator
            .analyze_article(
                "a-1",
                "I love this amazing breakthrough in AI!",
                &AnalysisOptions::heuristic_only(),
            )
            .await
            .unwrap();

        assert_eq!(result.sentiment().unwrap().label, SentimentLabel::Positive);
        assert_eq!(result.total_cost, 0.0);
        assert!(result.analyzer_results().all(|r| r.used_fallback && r.cost == 0.0));
        assert_eq!(h.client.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_content_rejected_before_any_work() {
        let h = harness(ScriptedInferenceClient::new().always_text(UNIVERSAL_JSON));

        let error = h
            .orchestrator
            .analyze_article("a-1", "   \n\t", &AnalysisOptions::default())
            .await
            .unwrap_err();

        assert!(error.is_validation());
        assert_eq!(h.client.calls(), 0);
        assert_eq!(h.cache.size().await.unwrap(), 0);
        assert_eq!(h.limiter.window_count("gpt-4o-mini", WINDOW).await, 0);
    }

    #[tokio::test]
    async fn test_empty_id_rejected() {
        let h = harness(ScriptedInferenceClient::new());

        let error = h
            .orchestrator
            .analyze_article("", "Some content.", &AnalysisOptions::default())
            .await
            .unwrap_err();

        assert!(error.is_validation());
    }

    #[tokio::test]
    async fn test_external_results_are_combined() {
        let h = harness(ScriptedInferenceClient::new().always_text(UNIVERSAL_JSON));

        let result = h
            .orchestrator
            .analyze_article(
                "a-1",
                "New chips from the startup doubled inference speed.",
                &AnalysisOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(h.client.calls(), 4);
        assert!(!result.is_degraded());
        assert!(result.analyzer_results().all(|r| !r.used_fallback));

        let cost_sum: f64 = result.analyzer_results().map(|r| r.cost).sum();
        assert!(result.total_cost > 0.0);
        assert!((result.total_cost - cost_sum).abs() < 1e-12);
        assert!((h.orchestrator.cost_summary().total_cost - cost_sum).abs() < 1e-12);

        // 0.40 * 0.6 + 0.25 * 0.8 + 0.15 * 0.5 + 0.20 * 0.7
        assert!((result.combined_score - 0.655).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_repeat_analysis_hits_cache_without_admissions() {
        let h = harness(ScriptedInferenceClient::new().always_text(UNIVERSAL_JSON));
        let content = "Regulators approved the merger after a long review.";
        let options = AnalysisOptions::default();

        let first = h.orchestrator.analyze_article("a-1", content, &options).await.unwrap();
        let admitted = h.limiter.window_count("gpt-4o-mini", WINDOW).await
            + h.limiter.window_count("gpt-4o", WINDOW).await;

        let second = h.orchestrator.analyze_article("a-1", content, &options).await.unwrap();

        assert!(second.analyzer_results().all(|r| r.cached && r.cost == 0.0));
        assert_eq!(second.total_cost, 0.0);
        for kind in AnalyzerKind::ALL {
            assert_eq!(first.get(kind).unwrap().payload, second.get(kind).unwrap().payload);
        }
        assert_eq!(h.client.calls(), 4);
        assert_eq!(
            h.limiter.window_count("gpt-4o-mini", WINDOW).await
                + h.limiter.window_count("gpt-4o", WINDOW).await,
            admitted
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_failures_then_success_counts_four_attempts() {
        let h = harness(
            ScriptedInferenceClient::new()
                .then_fail(InferenceError::server("502"), 3)
                .always_text(UNIVERSAL_JSON),
        );

        let options = AnalysisOptions::default();
        let analyzer = AnalyzerRegistry::standard()
            .require(AnalyzerKind::Sentiment)
            .unwrap()
            .clone();

        let result = h
            .orchestrator
            .pipeline()
            .analyze(analyzer.as_ref(), "Shares rose after the results.", &options)
            .await
            .unwrap();

        assert!(!result.used_fallback);
        assert_eq!(result.attempts, 4);
        assert_eq!(
            result.payload,
            crate::domain::AnalysisPayload::Sentiment(crate::domain::SentimentResult::new(0.5, 0.8))
        );
    }

    #[tokio::test]
    async fn test_analyzer_without_words_is_degraded() {
        let h = harness(ScriptedInferenceClient::new());

        let result = h
            .orchestrator
            .analyze_article("a-1", "?! ... !!", &AnalysisOptions::heuristic_only())
            .await
            .unwrap();

        assert!(result.sentiment.is_none());
        assert!(result.degraded.contains_key(&AnalyzerKind::Sentiment));
        assert!((0.0..=1.0).contains(&result.combined_score));
    }

    #[tokio::test]
    async fn test_article_metadata_feeds_relevance() {
        let h = harness(ScriptedInferenceClient::new());
        let article = Article::new("a-1", "The central bank raised interest rates again.")
            .with_source("reuters.com")
            .with_published_at(chrono::Utc::now());

        let result = h
            .orchestrator
            .analyze(&article, &AnalysisOptions::heuristic_only())
            .await
            .unwrap();

        let signals = result.relevance().unwrap().signals.clone().unwrap();
        assert!(signals.recency > 0.9);
        assert!(signals.source_trust > 0.5);
    }

    #[tokio::test]
    async fn test_custom_weights_are_normalized() {
        let h = harness(ScriptedInferenceClient::new());
        let orchestrator = h
            .orchestrator
            .with_weights(ScoreWeights::new(2.0, 0.0, 0.0, 0.0));

        assert!((orchestrator.weights().relevance - 1.0).abs() < 1e-12);

        let result = orchestrator
            .analyze_article(
                "a-1",
                "Scientists published a study on ocean warming.",
                &AnalysisOptions::heuristic_only(),
            )
            .await
            .unwrap();

        let relevance = result.relevance().unwrap().score;
        assert!((result.combined_score - relevance).abs() < 1e-9);
    }
}
