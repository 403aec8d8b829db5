//! Topic analyzer

use std::collections::HashSet;

use serde::Deserialize;

use super::lexicon::{is_known_category, GENERAL_TOPIC, TOPIC_CATEGORIES};
use super::text::{parse_json_response, tokenize};
use crate::domain::{
    AnalysisOptions, AnalysisPayload, Analyzer, AnalyzerKind, DomainError, TopicResult,
};

const MAX_SECONDARY: usize = 2;

#[derive(Debug, Deserialize)]
struct TopicResponse {
    primary: String,
    confidence: f64,
    #[serde(default)]
    secondary: Vec<String>,
}

/// Primary news category of an article
#[derive(Debug, Clone, Default)]
pub struct TopicAnalyzer;

impl TopicAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn category_list() -> String {
        TOPIC_CATEGORIES
            .iter()
            .map(|(name, _)| *name)
            .chain(std::iter::once(GENERAL_TOPIC))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Keyword hits per category, best first; ties keep declaration order
    fn category_hits(tokens: &[String]) -> Vec<(&'static str, usize)> {
        let words: HashSet<&str> = tokens.iter().map(String::as_str).collect();

        let mut hits: Vec<(&'static str, usize)> = TOPIC_CATEGORIES
            .iter()
            .map(|(name, keywords)| {
                let count = keywords.iter().filter(|k| words.contains(*k)).count();
                (*name, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();

        // Stable sort preserves declaration order among equal counts
        hits.sort_by(|a, b| b.1.cmp(&a.1));
        hits
    }
}

impl Analyzer for TopicAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Topic
    }

    fn max_tokens(&self) -> u32 {
        80
    }

    fn build_prompt(&self, text: &str, _options: &AnalysisOptions) -> String {
        format!(
            r#"Classify the following news article into one primary category.

Allowed categories: {}

Respond with a JSON object only, in this format:
{{"primary": "<category>", "confidence": <number from 0.0 to 1.0>, "secondary": ["<category>", ...]}}

Article:
{}"#,
            Self::category_list(),
            text
        )
    }

    fn parse_response(
        &self,
        response: &str,
        _text: &str,
        _options: &AnalysisOptions,
    ) -> Result<AnalysisPayload, DomainError> {
        let parsed: TopicResponse = parse_json_response(response)
            .map_err(|e| DomainError::invalid_response(self.kind(), e))?;

        let primary = parsed.primary.trim().to_lowercase();
        if !is_known_category(&primary) {
            return Err(DomainError::invalid_response(
                self.kind(),
                format!("unknown category '{}'", parsed.primary),
            ));
        }

        if !parsed.confidence.is_finite() || !(0.0..=1.0).contains(&parsed.confidence) {
            return Err(DomainError::invalid_response(
                self.kind(),
                format!("confidence {} outside [0, 1]", parsed.confidence),
            ));
        }

        let mut secondary: Vec<String> = Vec::new();
        for category in parsed.secondary {
            let category = category.trim().to_lowercase();
            if category != primary && is_known_category(&category) && !secondary.contains(&category) {
                secondary.push(category);
            }
        }
        secondary.truncate(MAX_SECONDARY);

        Ok(AnalysisPayload::Topic(TopicResult {
            primary,
            confidence: parsed.confidence,
            secondary,
        }))
    }

    fn fallback(
        &self,
        text: &str,
        _options: &AnalysisOptions,
    ) -> Result<AnalysisPayload, DomainError> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(DomainError::fallback_exhausted(
                self.kind(),
                "no words to classify",
            ));
        }

        let hits = Self::category_hits(&tokens);
        let total: usize = hits.iter().map(|(_, count)| count).sum();

        let result = match hits.first() {
            Some((primary, count)) => TopicResult {
                primary: primary.to_string(),
                confidence: *count as f64 / total as f64,
                secondary: hits
                    .iter()
                    .skip(1)
                    .take(MAX_SECONDARY)
                    .map(|(name, _)| name.to_string())
                    .collect(),
            },
            None => TopicResult {
                primary: GENERAL_TOPIC.to_string(),
                confidence: 0.0,
                secondary: Vec::new(),
            },
        };

        Ok(AnalysisPayload::Topic(result))
    }
}
