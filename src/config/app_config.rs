use std::time::Duration;

use serde::Deserialize;

use crate::domain::usage::CostConfig;
use crate::domain::{DomainError, ScoreWeights};
use crate::infrastructure::analyzers::PipelineConfig;
use crate::infrastructure::inference::InferenceConfig;
use crate::infrastructure::resilience::{RateLimitConfig, RetryConfig, RetryPolicy};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub cost: CostConfig,
    #[serde(default)]
    pub scoring: ScoreWeights,
    #[serde(default)]
    pub inference: InferenceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Analysis engine settings
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Try external inference before the local heuristics
    #[serde(default = "default_true")]
    pub use_external: bool,
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
    #[serde(default = "default_summary_sentences")]
    pub summary_sentences: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl_seconds() -> u64 {
    3600
}

fn default_cache_max_entries() -> usize {
    1_000
}

fn default_max_concurrent() -> usize {
    5
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_max_prompt_chars() -> usize {
    8000
}

fn default_summary_sentences() -> usize {
    3
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            use_external: true,
            cache_ttl_seconds: default_cache_ttl_seconds(),
            cache_max_entries: default_cache_max_entries(),
            max_concurrent: default_max_concurrent(),
            request_timeout_seconds: default_request_timeout_seconds(),
            max_prompt_chars: default_max_prompt_chars(),
            summary_sentences: default_summary_sentences(),
        }
    }
}

impl EngineConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl AppConfig {
    /// Load `config/default`, `config/local` and `APP__*` variables, in that order
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        self.scoring.validate()?;
        self.rate_limit.validate()?;
        RetryPolicy::from_config(&self.retry)?;

        if self.engine.max_prompt_chars == 0 {
            return Err(DomainError::configuration(
                "engine.max_prompt_chars must be greater than zero",
            ));
        }

        if self.engine.request_timeout_seconds == 0 {
            return Err(DomainError::configuration(
                "engine.request_timeout_seconds must be greater than zero",
            ));
        }

        if self.engine.cache_max_entries == 0 {
            return Err(DomainError::configuration(
                "engine.cache_max_entries must be greater than zero",
            ));
        }

        if let Some(budget) = self.cost.budget_usd {
            if !budget.is_finite() || budget < 0.0 {
                return Err(DomainError::configuration(format!(
                    "cost.budget_usd must be a non-negative number, got {}",
                    budget
                )));
            }
        }

        Ok(())
    }

    /// Settings of the per-analyzer pipeline
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            cache_ttl: self.engine.cache_ttl(),
            request_timeout: self.engine.request_timeout(),
            max_prompt_chars: self.engine.max_prompt_chars,
            budget_usd: self.cost.budget_usd,
        }
    }
}
