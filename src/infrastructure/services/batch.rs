//! Batch coordinator - bounded-concurrency enrichment of many articles

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::EnrichmentOrchestrator;
use crate::domain::{AnalysisOptions, AnalysisResult, Article, BatchOutcome, DomainError};
use crate::infrastructure::observability::record_batch_item;

/// Outcome of one spawned article task
enum ItemOutcome {
    Analyzed(AnalysisResult),
    Failed(DomainError),
    Panicked(String),
}

/// Runs the orchestrator over a batch with a bound on in-flight articles
#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    orchestrator: Arc<EnrichmentOrchestrator>,
}

impl BatchCoordinator {
    pub fn new(orchestrator: Arc<EnrichmentOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &Arc<EnrichmentOrchestrator> {
        &self.orchestrator
    }

    /// Analyze every article, keeping at most `max_concurrent` in flight
    ///
    /// Each article id ends up in exactly one of `results` or `errors`.
    /// A failure or panic while analyzing one article never affects the others.
    #[instrument(
        skip(self, articles, options),
        fields(batch_id = %Uuid::new_v4(), articles = articles.len())
    )]
    pub async fn batch_analyze(
        &self,
        articles: Vec<Article>,
        options: &AnalysisOptions,
        max_concurrent: usize,
    ) -> BatchOutcome {
        let started = Instant::now();
        let max_concurrent = max_concurrent.max(1);
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut outcome = BatchOutcome::new();
        let mut scheduled = HashSet::new();
        let mut tasks = JoinSet::new();

        for article in articles {
            if !scheduled.insert(article.id.clone()) {
                warn!(article_id = %article.id, "Duplicate article id in batch, skipping");
                outcome.stats.skipped_duplicates += 1;
                record_batch_item("skipped");
                continue;
            }

            let orchestrator = self.orchestrator.clone();
            let options = options.for_article(&article);
            let semaphore = semaphore.clone();
            let in_flight = in_flight.clone();
            let peak = peak.clone();

            tasks.spawn(async move {
                // The semaphore is never closed while tasks exist
                let _permit = semaphore.acquire_owned().await.ok();

                let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(current, Ordering::SeqCst);

                let analysis = AssertUnwindSafe(orchestrator.analyze_article(
                    &article.id,
                    &article.content,
                    &options,
                ))
                .catch_unwind()
                .await;

                in_flight.fetch_sub(1, Ordering::SeqCst);

                let item = match analysis {
                    Ok(Ok(result)) => ItemOutcome::Analyzed(result),
                    Ok(Err(e)) => ItemOutcome::Failed(e),
                    Err(panic) => ItemOutcome::Panicked(panic_message(panic.as_ref())),
                };

                (article.id, item)
            });
        }

        outcome.stats.total = scheduled.len();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, ItemOutcome::Analyzed(result))) => {
                    debug!(article_id = %id, "Batch item analyzed");
                    record_batch_item("succeeded");
                    outcome.record_success(result);
                }
                Ok((id, ItemOutcome::Failed(e))) => {
                    warn!(article_id = %id, error = %e, "Batch item failed");
                    record_batch_item("failed");
                    outcome.record_failure(id, e.to_string());
                }
                Ok((id, ItemOutcome::Panicked(message))) => {
                    warn!(article_id = %id, panic = %message, "Batch item panicked");
                    record_batch_item("failed");
                    outcome.record_failure(id, format!("Analysis panicked: {}", message));
                }
                Err(e) => {
                    // Only reachable if the runtime cancels the task
                    warn!(error = %e, "Batch task did not complete");
                }
            }
        }

        for id in scheduled {
            if !outcome.results.contains_key(&id) && !outcome.errors.contains_key(&id) {
                record_batch_item("failed");
                outcome.record_failure(id, "Analysis task did not complete");
            }
        }

        outcome.stats.succeeded = outcome.results.len();
        outcome.stats.failed = outcome.errors.len();
        outcome.stats.peak_in_flight = peak.load(Ordering::SeqCst);
        outcome.stats.total_cost = outcome.total_cost();
        outcome.stats.elapsed = started.elapsed();

        info!(
            total = outcome.stats.total,
            succeeded = outcome.stats.succeeded,
            failed = outcome.stats.failed,
            peak_in_flight = outcome.stats.peak_in_flight,
            total_cost = outcome.stats.total_cost,
            "Batch complete"
        );

        outcome
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
