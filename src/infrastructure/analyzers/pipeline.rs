//! Shared execution path of every analyzer
//!
//! Per call: cache lookup, then the external path (rate-limit admission and
//! a timed inference call per attempt, wrapped in retries), then the local
//! heuristic if the external path is unavailable or fails. Successful and
//! fallback results are cached; a call where both paths fail is not.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use super::text::truncate_chars;
use crate::domain::cache::{Cache, CacheExt};
use crate::domain::{
    AnalysisKey, AnalysisOptions, AnalysisPayload, Analyzer, AnalyzerKind, AnalyzerResult,
    CostModel, DomainError, InferenceClient, InferenceError,
};
use crate::infrastructure::observability::{
    record_analyzer_call, record_inference_call, InferenceMetricParams,
};
use crate::infrastructure::resilience::{ErrorClass, RateLimiter, RetryController, RetryError};
use crate::infrastructure::usage::CostLedger;

/// Pipeline tuning
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub cache_ttl: Duration,
    /// Timeout of a single external call
    pub request_timeout: Duration,
    /// Article characters included in a prompt
    pub max_prompt_chars: usize,
    /// Spend after which the external path is skipped
    ///
    /// Soft cap: the check runs before each call with no reservation, so
    /// calls already in flight when it is crossed still complete and bill.
    pub budget_usd: Option<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            request_timeout: Duration::from_secs(30),
            max_prompt_chars: 8000,
            budget_usd: None,
        }
    }
}

/// How a result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPath {
    Cache,
    External,
    Fallback,
    Failed,
}

impl ResolutionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::External => "external",
            Self::Fallback => "fallback",
            Self::Failed => "failed",
        }
    }
}

/// Cache entry for one analyzer result
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedAnalysis {
    payload: AnalysisPayload,
    used_fallback: bool,
    model: Option<String>,
}

struct ExternalSuccess {
    payload: AnalysisPayload,
    cost: f64,
    model: String,
    attempts: u32,
}

struct ExternalFailure {
    error: DomainError,
    attempts: u32,
}

/// Runs analyzers against the cache, rate limiter, retry controller and cost model
#[derive(Debug)]
pub struct AnalysisPipeline {
    cache: Arc<dyn Cache>,
    rate_limiter: Arc<RateLimiter>,
    retry: RetryController,
    cost_model: Arc<CostModel>,
    ledger: Arc<CostLedger>,
    client: Option<Arc<dyn InferenceClient>>,
    config: PipelineConfig,
}

impl AnalysisPipeline {
    pub fn new(
        cache: Arc<dyn Cache>,
        rate_limiter: Arc<RateLimiter>,
        retry: RetryController,
        cost_model: Arc<CostModel>,
    ) -> Self {
        Self {
            cache,
            rate_limiter,
            retry,
            cost_model,
            ledger: Arc::new(CostLedger::new()),
            client: None,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_client(mut self, client: Option<Arc<dyn InferenceClient>>) -> Self {
        self.client = client;
        self
    }

    pub fn with_ledger(mut self, ledger: Arc<CostLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ledger(&self) -> &Arc<CostLedger> {
        &self.ledger
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Produce one analyzer result for `text`
    #[instrument(skip_all, fields(kind = %analyzer.kind()))]
    pub async fn analyze(
        &self,
        analyzer: &dyn Analyzer,
        text: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalyzerResult, DomainError> {
        let started = Instant::now();
        let kind = analyzer.kind();
        let key = AnalysisKey::new(text, kind, &analyzer.options_fingerprint(options)).as_cache_key();

        if let Some(cached) = self.lookup(&key, kind).await {
            debug!(key = %key, "Cache hit");
            let latency = started.elapsed();
            record_analyzer_call(kind.as_str(), ResolutionPath::Cache.as_str(), latency);

            return Ok(AnalyzerResult {
                payload: cached.payload,
                used_fallback: cached.used_fallback,
                cached: true,
                cost: 0.0,
                model: cached.model,
                attempts: 0,
                latency,
            });
        }

        let mut attempts = 0;

        if let Some(client) = self.external_client(options) {
            match self.run_external(client.as_ref(), analyzer, text, options).await {
                Ok(success) => {
                    let result = AnalyzerResult {
                        payload: success.payload,
                        used_fallback: false,
                        cached: false,
                        cost: success.cost,
                        model: Some(success.model),
                        attempts: success.attempts,
                        latency: started.elapsed(),
                    };

                    self.store(&key, &result).await;
                    record_analyzer_call(kind.as_str(), ResolutionPath::External.as_str(), result.latency);
                    return Ok(result);
                }
                Err(failure) => {
                    debug!(
                        attempts = failure.attempts,
                        error = %failure.error,
                        "External inference failed, using fallback"
                    );
                    attempts = failure.attempts;
                }
            }
        }

        let payload = match analyzer.fallback(text, options) {
            Ok(payload) => payload,
            Err(error) => {
                record_analyzer_call(kind.as_str(), ResolutionPath::Failed.as_str(), started.elapsed());
                warn!(error = %error, "Analyzer fallback failed");

                return Err(match error {
                    DomainError::FallbackExhausted { .. } => error,
                    other => DomainError::fallback_exhausted(kind, other.to_string()),
                });
            }
        };

        let result = AnalyzerResult {
            payload,
            used_fallback: true,
            cached: false,
            cost: 0.0,
            model: None,
            attempts,
            latency: started.elapsed(),
        };

        debug!("Fallback heuristic used");
        self.store(&key, &result).await;
        record_analyzer_call(kind.as_str(), ResolutionPath::Fallback.as_str(), result.latency);
        Ok(result)
    }

    fn external_client(&self, options: &AnalysisOptions) -> Option<&Arc<dyn InferenceClient>> {
        if !options.use_external {
            return None;
        }

        let client = self.client.as_ref()?;

        if self.ledger.budget_exhausted(self.config.budget_usd) {
            debug!(
                budget_usd = self.config.budget_usd,
                "Cost budget reached, skipping external inference"
            );
            return None;
        }

        Some(client)
    }

    async fn run_external(
        &self,
        client: &dyn InferenceClient,
        analyzer: &dyn Analyzer,
        text: &str,
        options: &AnalysisOptions,
    ) -> Result<ExternalSuccess, ExternalFailure> {
        let model = self.cost_model.select_model(analyzer.kind());
        let prompt = analyzer.build_prompt(truncate_chars(text, self.config.max_prompt_chars), options);
        let prompt = prompt.as_str();
        let max_tokens = analyzer.max_tokens();
        let timeout = self.config.request_timeout;
        let limiter = self.rate_limiter.as_ref();

        let outcome = self
            .retry
            .run(
                move |attempt| async move {
                    let admission = limiter.admit(model).await;
                    debug!(
                        attempt = attempt,
                        model = model,
                        waited_ms = admission.waited().as_millis() as u64,
                        "Calling inference provider"
                    );

                    match tokio::time::timeout(timeout, client.complete(prompt, model, max_tokens)).await {
                        Ok(result) => result,
                        Err(_) => Err(InferenceError::Timeout),
                    }
                },
                |error: &InferenceError| {
                    if error.is_transient() {
                        ErrorClass::Transient
                    } else {
                        ErrorClass::Permanent
                    }
                },
            )
            .await;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(error) => {
                record_inference_call(InferenceMetricParams {
                    model,
                    success: false,
                    input_tokens: 0,
                    output_tokens: 0,
                    cost_usd: 0.0,
                });

                let attempts = error.attempts();
                let error = match error {
                    RetryError::Exhausted {
                        attempts,
                        last_error,
                        ..
                    } => DomainError::RetriesExhausted {
                        attempts,
                        last_error,
                    },
                    RetryError::Permanent { error, .. } => DomainError::Inference(error),
                };

                return Err(ExternalFailure { error, attempts });
            }
        };

        let completion = outcome.value;
        let record = self.cost_model.compute_cost(&completion.usage, model);
        self.ledger.record(&record);

        record_inference_call(InferenceMetricParams {
            model,
            success: true,
            input_tokens: completion.usage.prompt_tokens as u64,
            output_tokens: completion.usage.completion_tokens as u64,
            cost_usd: record.cost,
        });

        match analyzer.parse_response(&completion.text, text, options) {
            Ok(payload) => Ok(ExternalSuccess {
                payload,
                cost: record.cost,
                model: model.to_string(),
                attempts: outcome.attempts,
            }),
            Err(error) => {
                debug!(error = %error, "Inference response failed validation");
                Err(ExternalFailure {
                    error,
                    attempts: outcome.attempts,
                })
            }
        }
    }

    /// Cache read; failures and foreign payloads read as a miss
    async fn lookup(&self, key: &str, kind: AnalyzerKind) -> Option<CachedAnalysis> {
        match self.cache.get::<CachedAnalysis>(key).await {
            Ok(Some(cached)) if cached.payload.kind() == kind => Some(cached),
            Ok(Some(_)) => {
                warn!(key = %key, "Cached payload has the wrong kind, ignoring");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn store(&self, key: &str, result: &AnalyzerResult) {
        let entry = CachedAnalysis {
            payload: result.payload.clone(),
            used_fallback: result.used_fallback,
            model: result.model.clone(),
        };

        if let Err(e) = self.cache.set(key, &entry, self.config.cache_ttl).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }
    }
}
