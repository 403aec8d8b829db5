//! Canonicalized article input

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DomainError;

/// Maximum length for article IDs
pub const MAX_ARTICLE_ID_LENGTH: usize = 256;

/// An article delivered by the normalization stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            source: None,
            published_at: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_article(&self.id, &self.content)
    }
}

/// Reject input before any cache, rate-limit or cost work happens
pub fn validate_article(id: &str, content: &str) -> Result<(), DomainError> {
    if id.trim().is_empty() {
        return Err(DomainError::validation("Article ID cannot be empty"));
    }

    if id.len() > MAX_ARTICLE_ID_LENGTH {
        return Err(DomainError::validation(format!(
            "Article ID too long: {} characters (max {})",
            id.len(),
            MAX_ARTICLE_ID_LENGTH
        )));
    }

    if content.trim().is_empty() {
        return Err(DomainError::validation(format!(
            "Article '{}' has empty content",
            id
        )));
    }

    Ok(())
}
