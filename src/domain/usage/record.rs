//! Cost records and their aggregates

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Cost of one external inference call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// Cost in USD
    pub cost: f64,
}

impl CostRecord {
    pub fn new(model: impl Into<String>, prompt_tokens: u32, completion_tokens: u32, cost: f64) -> Self {
        Self {
            model: model.into(),
            prompt_tokens,
            completion_tokens,
            cost,
        }
    }

    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Aggregated usage for one model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub requests: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cost: f64,
}

impl ModelUsage {
    pub fn add_record(&mut self, record: &CostRecord) {
        self.requests += 1;
        self.prompt_tokens += record.prompt_tokens as u64;
        self.completion_tokens += record.completion_tokens as u64;
        self.cost += record.cost;
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Snapshot of all recorded spend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub total_requests: u64,
    pub total_tokens: u64,
    /// Total cost in USD
    pub total_cost: f64,
    pub by_model: HashMap<String, ModelUsage>,
}

impl CostSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cost record to the summary
    pub fn add_record(&mut self, record: &CostRecord) {
        self.total_requests += 1;
        self.total_tokens += record.total_tokens() as u64;
        self.total_cost += record.cost;

        self.by_model
            .entry(record.model.clone())
            .or_default()
            .add_record(record);
    }
}
