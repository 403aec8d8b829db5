use thiserror::Error;

use super::analysis::AnalyzerKind;
use super::inference::InferenceError;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        attempts: u32,
        last_error: InferenceError,
    },

    #[error("Invalid {kind} response: {message}")]
    InvalidResponse { kind: AnalyzerKind, message: String },

    #[error("Fallback exhausted for {kind}: {message}")]
    FallbackExhausted { kind: AnalyzerKind, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_response(kind: AnalyzerKind, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            kind,
            message: message.into(),
        }
    }

    pub fn fallback_exhausted(kind: AnalyzerKind, message: impl Into<String>) -> Self {
        Self::FallbackExhausted {
            kind,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error came from the input rather than the engine
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
