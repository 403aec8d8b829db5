//! Relevance analyzer

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::lexicon::{source_trust, DEFAULT_INTEREST_TERMS};
use super::text::{parse_json_response, tokenize};
use crate::domain::{
    AnalysisOptions, AnalysisPayload, Analyzer, AnalyzerKind, DomainError, RelevanceResult,
    RelevanceSignals,
};

const RECENCY_WEIGHT: f64 = 0.3;
const TRUST_WEIGHT: f64 = 0.3;
const KEYWORD_WEIGHT: f64 = 0.4;

/// Age at which recency halves
const RECENCY_HALF_LIFE_HOURS: f64 = 24.0;

/// Recency assumed when the publication time is unknown
const UNKNOWN_RECENCY: f64 = 0.5;

/// Default interest hits at which the keyword signal saturates
const INTEREST_SATURATION: f64 = 3.0;

#[derive(Debug, Deserialize)]
struct RelevanceResponse {
    relevance: f64,
    #[serde(default)]
    reason: Option<String>,
}

/// How relevant an article is to the reader
#[derive(Debug, Clone, Default)]
pub struct RelevanceAnalyzer;

impl RelevanceAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Exponential decay with a 24 hour half-life; future dates count as fresh
    pub fn recency(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
        let Some(published_at) = published_at else {
            return UNKNOWN_RECENCY;
        };

        let age_hours = (now - published_at).num_seconds().max(0) as f64 / 3600.0;
        0.5f64.powf(age_hours / RECENCY_HALF_LIFE_HOURS)
    }

    /// Share of the reader's keywords found in the text, or the density of
    /// general interest terms when no keywords are given
    pub fn keyword_match(text: &str, keywords: &std::collections::BTreeSet<String>) -> f64 {
        let tokens = tokenize(text);
        let words: HashSet<&str> = tokens.iter().map(String::as_str).collect();

        if keywords.is_empty() {
            let hits = DEFAULT_INTEREST_TERMS
                .iter()
                .filter(|term| words.contains(**term))
                .count();
            return (hits as f64 / INTEREST_SATURATION).min(1.0);
        }

        let lowered = text.to_lowercase();
        let matched = keywords
            .iter()
            .filter(|keyword| {
                if keyword.contains(char::is_whitespace) {
                    lowered.contains(keyword.as_str())
                } else {
                    words.contains(keyword.as_str())
                }
            })
            .count();

        matched as f64 / keywords.len() as f64
    }

    fn signals(text: &str, options: &AnalysisOptions) -> RelevanceSignals {
        RelevanceSignals {
            recency: Self::recency(options.published_at, Utc::now()),
            source_trust: source_trust(options.source.as_deref()),
            keyword_match: Self::keyword_match(text, &options.keywords),
        }
    }
}

impl Analyzer for RelevanceAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Relevance
    }

    fn options_fingerprint(&self, options: &AnalysisOptions) -> String {
        let keywords: Vec<&str> = options.keywords.iter().map(String::as_str).collect();

        format!(
            "external={};keywords={};source={};published_at={}",
            options.use_external,
            keywords.join(","),
            options.source.as_deref().unwrap_or(""),
            options
                .published_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default()
        )
    }

    fn max_tokens(&self) -> u32 {
        120
    }

    fn build_prompt(&self, text: &str, options: &AnalysisOptions) -> String {
        let interests = if options.keywords.is_empty() {
            "general news readers".to_string()
        } else {
            options
                .keywords
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };

        let published = options
            .published_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());

        format!(
            r#"Rate how relevant the following news article is for a reader interested in: {}.
Source: {}
Published: {}

Respond with a JSON object only, in this format:
{{"relevance": <number from 0.0 to 1.0>, "reason": "<one short sentence>"}}

Article:
{}"#,
            interests,
            options.source.as_deref().unwrap_or("unknown"),
            published,
            text
        )
    }

    fn parse_response(
        &self,
        response: &str,
        _text: &str,
        _options: &AnalysisOptions,
    ) -> Result<AnalysisPayload, DomainError> {
        let parsed: RelevanceResponse = parse_json_response(response)
            .map_err(|e| DomainError::invalid_response(self.kind(), e))?;

        if !parsed.relevance.is_finite() || !(0.0..=1.0).contains(&parsed.relevance) {
            return Err(DomainError::invalid_response(
                self.kind(),
                format!("relevance {} outside [0, 1]", parsed.relevance),
            ));
        }

        Ok(AnalysisPayload::Relevance(RelevanceResult {
            score: parsed.relevance,
            signals: None,
            reason: parsed.reason.filter(|r| !r.trim().is_empty()),
        }))
    }

    fn fallback(
        &self,
        text: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalysisPayload, DomainError> {
        if tokenize(text).is_empty() {
            return Err(DomainError::fallback_exhausted(
                self.kind(),
                "no words to match",
            ));
        }

        let signals = Self::signals(text, options);
        let score = RECENCY_WEIGHT * signals.recency
            + TRUST_WEIGHT * signals.source_trust
            + KEYWORD_WEIGHT * signals.keyword_match;

        Ok(AnalysisPayload::Relevance(RelevanceResult {
            score: score.clamp(0.0, 1.0),
            signals: Some(signals),
            reason: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn heuristic(text: &str, options: &AnalysisOptions) -> RelevanceResult {
        match RelevanceAnalyzer::new().fallback(text, options).unwrap() {
            AnalysisPayload::Relevance(r) => r,
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_recency_decay() {
        let now = Utc::now();
        assert!((RelevanceAnalyzer::recency(Some(now), now) - 1.0).abs() < 1e-9);
        assert!(
            (RelevanceAnalyzer::recency(Some(now - Duration::hours(24)), now) - 0.5).abs() < 1e-9
        );
        assert!(
            (RelevanceAnalyzer::recency(Some(now - Duration::hours(48)), now) - 0.25).abs() < 1e-9
        );
        assert_eq!(
            RelevanceAnalyzer::recency(Some(now + Duration::hours(3)), now),
            1.0
        );
        assert_eq!(RelevanceAnalyzer::recency(None, now), UNKNOWN_RECENCY);
    }

    #[test]
    fn test_keyword_match_fraction() {
        let options = AnalysisOptions::default().with_keywords(["rust", "compiler", "machine learning"]);
        let text = "The Rust compiler now ships machine learning diagnostics.";
        assert!((RelevanceAnalyzer::keyword_match(text, &options.keywords) - 1.0).abs() < 1e-9);

        let text = "The Rust release is out.";
        let score = RelevanceAnalyzer::keyword_match(text, &options.keywords);
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_matching_keywords_raise_relevance() {
        let text = "OpenAI announced a new reasoning model for developers.";
        let matched = heuristic(text, &AnalysisOptions::default().with_keywords(["model", "openai"]));
        let unmatched = heuristic(text, &AnalysisOptions::default().with_keywords(["football"]));

        assert!(matched.score > unmatched.score);
        assert!((0.0..=1.0).contains(&matched.score));
        assert!(matched.signals.is_some());
    }

    #[test]
    fn test_trusted_fresh_source_scores_higher() {
        let text = "Central bank holds rates steady.";
        let fresh = AnalysisOptions::default()
            .with_source("reuters.com")
            .with_published_at(Utc::now());
        let stale = AnalysisOptions::default()
            .with_source("someblog.blogspot.com")
            .with_published_at(Utc::now() - Duration::days(10));

        assert!(heuristic(text, &fresh).score > heuristic(text, &stale).score);
    }

    #[test]
    fn test_fingerprint_tracks_relevance_options() {
        let analyzer = RelevanceAnalyzer::new();
        let base = AnalysisOptions::default();

        assert_ne!(
            analyzer.options_fingerprint(&base),
            analyzer.options_fingerprint(&base.clone().with_keywords(["ai"]))
        );
        assert_ne!(
            analyzer.options_fingerprint(&base),
            analyzer.options_fingerprint(&base.clone().with_source("bbc"))
        );
        assert_eq!(
            analyzer.options_fingerprint(&base),
            analyzer.options_fingerprint(&base.clone().with_summary_sentences(7))
        );
    }

    #[test]
    fn test_parse_response() {
        let analyzer = RelevanceAnalyzer::new();
        let options = AnalysisOptions::default();

        let payload = analyzer
            .parse_response(r#"{"relevance": 0.7, "reason": "Matches AI interest"}"#, "", &options)
            .unwrap();
        assert_eq!(
            payload,
            AnalysisPayload::Relevance(RelevanceResult {
                score: 0.7,
                signals: None,
                reason: Some("Matches AI interest".to_string()),
            })
        );

        assert!(analyzer.parse_response(r#"{"relevance": 1.5}"#, "", &options).is_err());
    }
}
