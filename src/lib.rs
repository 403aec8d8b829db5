//! PMP News Enrichment
//!
//! Annotates articles with sentiment, topic, summary and relevance:
//! - External LLM inference with local heuristic fallbacks
//! - TTL cache, per-model rate limiting and bounded retries
//! - Per-task model tiers with cost accounting
//! - Bounded-concurrency batch processing

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::{AnalysisOptions, CostModel, DomainError, InferenceClient};
use infrastructure::{
    analyzers::AnalysisPipeline,
    cache::{InMemoryCache, InMemoryCacheConfig},
    inference::InferenceClientFactory,
    resilience::{RateLimiter, RetryController, RetryPolicy},
    services::{BatchCoordinator, EnrichmentOrchestrator},
    usage::CostLedger,
};
use tracing::info;

/// Fully wired enrichment engine
#[derive(Debug, Clone)]
pub struct Engine {
    pub orchestrator: Arc<EnrichmentOrchestrator>,
    pub batch: BatchCoordinator,
    /// Options derived from the engine configuration
    pub default_options: AnalysisOptions,
    pub max_concurrent: usize,
}

/// Build the engine from configuration, creating the inference client it names
pub fn create_engine(config: &AppConfig) -> Result<Engine, DomainError> {
    let client = InferenceClientFactory::create(&config.inference)?;
    create_engine_with_client(config, client)
}

/// Build the engine around an existing inference client (or none)
pub fn create_engine_with_client(
    config: &AppConfig,
    client: Option<Arc<dyn InferenceClient>>,
) -> Result<Engine, DomainError> {
    config.validate()?;

    let cache = Arc::new(InMemoryCache::with_config(
        InMemoryCacheConfig::default()
            .with_max_capacity(config.engine.cache_max_entries as u64),
    ));
    let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limit));
    let retry = RetryController::new(RetryPolicy::from_config(&config.retry)?);
    let cost_model = Arc::new(CostModel::from_config(&config.cost)?);

    info!(
        external = client.is_some() && config.engine.use_external,
        default_model = %cost_model.default_model(),
        max_concurrent = config.engine.max_concurrent,
        "Creating enrichment engine"
    );

    let pipeline = AnalysisPipeline::new(cache, rate_limiter, retry, cost_model)
        .with_client(client)
        .with_ledger(Arc::new(CostLedger::new()))
        .with_config(config.pipeline_config());

    let orchestrator = Arc::new(
        EnrichmentOrchestrator::new(Arc::new(pipeline)).with_weights(config.scoring.clone()),
    );

    let default_options = AnalysisOptions::default()
        .with_external(config.engine.use_external)
        .with_summary_sentences(config.engine.summary_sentences);

    Ok(Engine {
        batch: BatchCoordinator::new(orchestrator.clone()),
        orchestrator,
        default_options,
        max_concurrent: config.engine.max_concurrent,
    })
}
