//! Model tier selection and cost computation

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{default_model_pricing, CostRecord, ModelPricing};
use crate::domain::analysis::AnalyzerKind;
use crate::domain::inference::Usage;
use crate::domain::DomainError;

const CHEAP_TIER: &str = "gpt-4o-mini";
const CAPABLE_TIER: &str = "gpt-4o";

/// Pricing entry as written in configuration (USD per 1K tokens)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub model: String,
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

/// Cost model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    /// Model used for tasks without an explicit mapping
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Analyzer kind name -> model tier
    #[serde(default = "default_task_models")]
    pub task_models: HashMap<String, String>,
    /// Extra or overriding prices; built-in prices apply otherwise
    #[serde(default)]
    pub pricing: Vec<PricingConfig>,
    /// Total spend after which the external path is skipped
    #[serde(default)]
    pub budget_usd: Option<f64>,
}

fn default_model() -> String {
    CHEAP_TIER.to_string()
}

const DEFAULT_TIERS: [(AnalyzerKind, &str); 4] = [
    (AnalyzerKind::Sentiment, CHEAP_TIER),
    (AnalyzerKind::Topic, CHEAP_TIER),
    (AnalyzerKind::Relevance, CHEAP_TIER),
    (AnalyzerKind::Summary, CAPABLE_TIER),
];

fn default_task_models() -> HashMap<String, String> {
    DEFAULT_TIERS
        .into_iter()
        .map(|(kind, model)| (kind.to_string(), model.to_string()))
        .collect()
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            task_models: default_task_models(),
            pricing: Vec::new(),
            budget_usd: None,
        }
    }
}

/// Selects a model tier per task and prices token usage
#[derive(Debug, Clone)]
pub struct CostModel {
    default_model: String,
    task_models: HashMap<AnalyzerKind, String>,
    pricing: HashMap<String, ModelPricing>,
}

/// Same tiers as `CostConfig::default()`
impl Default for CostModel {
    fn default() -> Self {
        DEFAULT_TIERS
            .into_iter()
            .fold(Self::new(CHEAP_TIER), |model, (kind, tier)| {
                model.with_task_model(kind, tier)
            })
    }
}

impl CostModel {
    /// Cost model with built-in prices and no task mappings
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            default_model: default_model.into(),
            task_models: HashMap::new(),
            pricing: default_model_pricing(),
        }
    }

    pub fn from_config(config: &CostConfig) -> Result<Self, DomainError> {
        if config.default_model.trim().is_empty() {
            return Err(DomainError::configuration("Default model cannot be empty"));
        }

        let mut model = Self::new(config.default_model.clone());

        for (kind, tier) in &config.task_models {
            let kind: AnalyzerKind = kind.parse().map_err(DomainError::configuration)?;
            model = model.with_task_model(kind, tier.clone());
        }

        for entry in &config.pricing {
            if entry.input_per_1k < 0.0 || entry.output_per_1k < 0.0 {
                return Err(DomainError::configuration(format!(
                    "Prices for model '{}' must not be negative",
                    entry.model
                )));
            }

            model = model.with_pricing(ModelPricing::new(
                entry.model.clone(),
                entry.input_per_1k,
                entry.output_per_1k,
            ));
        }

        Ok(model)
    }

    pub fn with_task_model(mut self, kind: AnalyzerKind, model: impl Into<String>) -> Self {
        self.task_models.insert(kind, model.into());
        self
    }

    pub fn with_pricing(mut self, pricing: ModelPricing) -> Self {
        self.pricing.insert(pricing.model_id.clone(), pricing);
        self
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Model tier for a task, or the default model when unmapped
    pub fn select_model(&self, kind: AnalyzerKind) -> &str {
        self.task_models
            .get(&kind)
            .map(String::as_str)
            .unwrap_or(&self.default_model)
    }

    pub fn pricing_for(&self, model: &str) -> Option<&ModelPricing> {
        self.pricing.get(model)
    }

    /// Price the usage of one call; unknown models cost nothing
    pub fn compute_cost(&self, usage: &Usage, model: &str) -> CostRecord {
        let cost = match self.pricing_for(model) {
            Some(pricing) => pricing.calculate_cost_usd(usage.prompt_tokens, usage.completion_tokens),
            None => {
                warn!(model = model, "No pricing configured for model, recording zero cost");
                0.0
            }
        };

        CostRecord::new(model, usage.prompt_tokens, usage.completion_tokens, cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_default_config() {
        let from_config = CostModel::from_config(&CostConfig::default()).unwrap();
        let model = CostModel::default();

        for kind in AnalyzerKind::ALL {
            assert_eq!(model.select_model(kind), from_config.select_model(kind));
        }
        assert_eq!(model.select_model(AnalyzerKind::Summary), "gpt-4o");
        assert_eq!(model.default_model(), from_config.default_model());
    }

    #[test]
    fn test_default_config_tiers() {
        let model = CostModel::from_config(&CostConfig::default()).unwrap();

        assert_eq!(model.select_model(AnalyzerKind::Sentiment), "gpt-4o-mini");
        assert_eq!(model.select_model(AnalyzerKind::Topic), "gpt-4o-mini");
        assert_eq!(model.select_model(AnalyzerKind::Summary), "gpt-4o");
    }

    #[test]
    fn test_unmapped_task_uses_default_model() {
        let model = CostModel::new("gpt-3.5-turbo").with_task_model(AnalyzerKind::Summary, "gpt-4o");

        assert_eq!(model.select_model(AnalyzerKind::Relevance), "gpt-3.5-turbo");
        assert_eq!(model.select_model(AnalyzerKind::Summary), "gpt-4o");
    }

    #[test]
    fn test_compute_cost() {
        let model = CostModel::new("custom").with_pricing(ModelPricing::new("custom", 0.01, 0.02));
        let record = model.compute_cost(&Usage::new(1000, 500), "custom");

        assert_eq!(record.model, "custom");
        assert_eq!(record.prompt_tokens, 1000);
        assert_eq!(record.completion_tokens, 500);
        assert!((record.cost - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_model_costs_zero() {
        let model = CostModel::default();
        let record = model.compute_cost(&Usage::new(1000, 1000), "mystery-model");
        assert_eq!(record.cost, 0.0);
    }

    #[test]
    fn test_config_pricing_overrides_builtin() {
        let config = CostConfig {
            pricing: vec![PricingConfig {
                model: "gpt-4o".to_string(),
                input_per_1k: 1.0,
                output_per_1k: 0.0,
            }],
            ..CostConfig::default()
        };

        let model = CostModel::from_config(&config).unwrap();
        let record = model.compute_cost(&Usage::new(1000, 0), "gpt-4o");
        assert!((record.cost - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_config_rejects_unknown_kind() {
        let mut config = CostConfig::default();
        config.task_models.insert("emotion".to_string(), "gpt-4o".to_string());
        assert!(CostModel::from_config(&config).is_err());
    }

    #[test]
    fn test_config_rejects_negative_prices() {
        let config = CostConfig {
            pricing: vec![PricingConfig {
                model: "x".to_string(),
                input_per_1k: -1.0,
                output_per_1k: 0.0,
            }],
            ..CostConfig::default()
        };
        assert!(CostModel::from_config(&config).is_err());
    }
}
