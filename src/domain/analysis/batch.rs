use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AnalysisResult;

/// Execution statistics of one batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Input articles skipped because their id was already scheduled
    pub skipped_duplicates: usize,
    /// Highest number of simultaneously in-flight article analyses
    pub peak_in_flight: usize,
    pub total_cost: f64,
    pub elapsed: Duration,
}

/// Results and per-article errors of a batch run
///
/// Every scheduled article id appears in exactly one of the two maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub results: BTreeMap<String, AnalysisResult>,
    pub errors: BTreeMap<String, String>,
    pub stats: BatchStats,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, result: AnalysisResult) {
        self.errors.remove(&result.article_id);
        self.results.insert(result.article_id.clone(), result);
    }

    pub fn record_failure(&mut self, article_id: impl Into<String>, reason: impl Into<String>) {
        let article_id = article_id.into();
        self.results.remove(&article_id);
        self.errors.insert(article_id, reason.into());
    }

    pub fn len(&self) -> usize {
        self.results.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_cost(&self) -> f64 {
        self.results.values().map(|r| r.total_cost).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, cost: f64) -> AnalysisResult {
        AnalysisResult {
            article_id: id.to_string(),
            sentiment: None,
            topic: None,
            summary: None,
            relevance: None,
            combined_score: 0.5,
            total_cost: cost,
            processing_time: Duration::from_millis(1),
            degraded: BTreeMap::new(),
        }
    }

    #[test]
    fn test_ids_land_in_exactly_one_map() {
        let mut outcome = BatchOutcome::new();
        outcome.record_failure("a", "boom");
        outcome.record_success(result("a", 0.0));
        outcome.record_success(result("b", 0.0));
        outcome.record_failure("b", "late failure");

        assert_eq!(outcome.len(), 2);
        assert!(outcome.results.contains_key("a"));
        assert!(!outcome.errors.contains_key("a"));
        assert!(outcome.errors.contains_key("b"));
        assert!(!outcome.results.contains_key("b"));
    }

    #[test]
    fn test_total_cost() {
        let mut outcome = BatchOutcome::new();
        outcome.record_success(result("a", 0.25));
        outcome.record_success(result("b", 0.5));
        assert!((outcome.total_cost() - 0.75).abs() < 1e-9);
    }
}
