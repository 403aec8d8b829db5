use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::article::Article;

/// Per-request analysis options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Attempt the external inference path before the local heuristic
    #[serde(default = "default_true")]
    pub use_external: bool,
    /// Keywords the reader cares about (lowercased)
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    /// Publishing source, used as a trust signal for relevance
    #[serde(default)]
    pub source: Option<String>,
    /// Publication time, used as a recency signal for relevance
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Target number of sentences in a summary
    #[serde(default = "default_summary_sentences")]
    pub summary_sentences: usize,
}

fn default_true() -> bool {
    true
}

fn default_summary_sentences() -> usize {
    3
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            use_external: true,
            keywords: BTreeSet::new(),
            source: None,
            published_at: None,
            summary_sentences: default_summary_sentences(),
        }
    }
}

impl AnalysisOptions {
    /// Options that never leave the process
    pub fn heuristic_only() -> Self {
        Self::default().with_external(false)
    }

    pub fn with_external(mut self, use_external: bool) -> Self {
        self.use_external = use_external;
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn with_summary_sentences(mut self, sentences: usize) -> Self {
        self.summary_sentences = sentences.max(1);
        self
    }

    /// Merge article metadata into a copy of these options
    pub fn for_article(&self, article: &Article) -> Self {
        let mut options = self.clone();

        if let Some(source) = &article.source {
            options.source = Some(source.clone());
        }

        if let Some(published_at) = article.published_at {
            options.published_at = Some(published_at);
        }

        options
    }
}
