use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::http_client::HttpClient;
use super::openai::OpenAiCompletionClient;
use crate::domain::{DomainError, InferenceClient};

const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Inference provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// `openai` or `openai_compatible`
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Override for the API base URL (required for `openai_compatible`)
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key; falls back to `OPENAI_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub temperature: f32,
}

fn default_provider() -> String {
    "openai".to_string()
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
            api_key: None,
            temperature: 0.0,
        }
    }
}

impl InferenceConfig {
    fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(OPENAI_API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Factory for creating inference clients
#[derive(Debug)]
pub struct InferenceClientFactory;

impl InferenceClientFactory {
    /// Create the configured client, or `None` when no credential is available
    pub fn create(
        config: &InferenceConfig,
    ) -> Result<Option<Arc<dyn InferenceClient>>, DomainError> {
        let api_key = match config.resolve_api_key() {
            Some(key) => key,
            None => {
                info!("No inference API key configured, analyzers will use local heuristics");
                return Ok(None);
            }
        };

        let http_client = HttpClient::new();

        let client = match config.provider.as_str() {
            "openai" => match &config.base_url {
                Some(base_url) => OpenAiCompletionClient::with_base_url(http_client, api_key, base_url),
                None => OpenAiCompletionClient::new(http_client, api_key),
            },
            "openai_compatible" => {
                let base_url = config.base_url.as_deref().ok_or_else(|| {
                    DomainError::configuration("openai_compatible provider requires a base_url")
                })?;
                OpenAiCompletionClient::with_base_url(http_client, api_key, base_url)
            }
            other => {
                return Err(DomainError::configuration(format!(
                    "Unknown inference provider: {}",
                    other
                )));
            }
        };

        info!(provider = %config.provider, "Inference client configured");
        Ok(Some(Arc::new(client.with_temperature(config.temperature))))
    }
}
