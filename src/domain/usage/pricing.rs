//! Model pricing configuration

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-model token prices, stored per 1K tokens in micro-dollars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Model ID this pricing applies to
    pub model_id: String,
    /// Price per 1K input tokens in micro-dollars
    pub input_price_per_1k_micros: i64,
    /// Price per 1K output tokens in micro-dollars
    pub output_price_per_1k_micros: i64,
}

impl ModelPricing {
    /// Create new model pricing from USD prices per 1K tokens
    pub fn new(model_id: impl Into<String>, input_per_1k: f64, output_per_1k: f64) -> Self {
        Self {
            model_id: model_id.into(),
            input_price_per_1k_micros: (input_per_1k * 1_000_000.0).round() as i64,
            output_price_per_1k_micros: (output_per_1k * 1_000_000.0).round() as i64,
        }
    }

    /// Get input price per 1K tokens in USD
    pub fn input_price_per_1k(&self) -> f64 {
        self.input_price_per_1k_micros as f64 / 1_000_000.0
    }

    /// Get output price per 1K tokens in USD
    pub fn output_price_per_1k(&self) -> f64 {
        self.output_price_per_1k_micros as f64 / 1_000_000.0
    }

    /// Calculate cost in USD: `prompt * priceIn + completion * priceOut`
    pub fn calculate_cost_usd(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        let micros_times_1k = prompt_tokens as f64 * self.input_price_per_1k_micros as f64
            + completion_tokens as f64 * self.output_price_per_1k_micros as f64;

        micros_times_1k / 1000.0 / 1_000_000.0
    }
}

/// Default pricing for common models
pub fn default_model_pricing() -> HashMap<String, ModelPricing> {
    [
        ModelPricing::new("gpt-4o", 0.005, 0.015),
        ModelPricing::new("gpt-4o-mini", 0.00015, 0.0006),
        ModelPricing::new("gpt-4-turbo", 0.01, 0.03),
        ModelPricing::new("gpt-3.5-turbo", 0.0005, 0.0015),
        ModelPricing::new("claude-3-5-sonnet-20241022", 0.003, 0.015),
        ModelPricing::new("claude-3-haiku-20240307", 0.00025, 0.00125),
    ]
    .into_iter()
    .map(|p| (p.model_id.clone(), p))
    .collect()
}
