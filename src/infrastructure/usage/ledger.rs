//! Process-wide cost ledger

use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::domain::usage::{CostRecord, CostSummary};

/// Aggregates the cost of every external inference call
#[derive(Debug, Default)]
pub struct CostLedger {
    summary: RwLock<CostSummary>,
}

impl CostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cost record
    pub fn record(&self, record: &CostRecord) {
        let mut summary = self.summary.write().unwrap_or_else(PoisonError::into_inner);
        summary.add_record(record);

        debug!(
            model = %record.model,
            cost = record.cost,
            total_cost = summary.total_cost,
            "Inference cost recorded"
        );
    }

    /// Snapshot of everything recorded so far
    pub fn summary(&self) -> CostSummary {
        self.summary
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Total spend in USD
    pub fn total_cost(&self) -> f64 {
        self.summary
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .total_cost
    }

    /// Whether the spend has reached `budget_usd`
    pub fn budget_exhausted(&self, budget_usd: Option<f64>) -> bool {
        budget_usd.is_some_and(|budget| self.total_cost() >= budget)
    }
}
