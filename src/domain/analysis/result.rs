use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AnalyzerKind;

/// Polarity label derived from a sentiment score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Scores at or beyond +/- this value are polar
    pub const THRESHOLD: f64 = 0.1;

    pub fn from_score(score: f64) -> Self {
        if score >= Self::THRESHOLD {
            Self::Positive
        } else if score <= -Self::THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Signed polarity in [-1, 1]
    pub score: f64,
    pub label: SentimentLabel,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl SentimentResult {
    /// Clamp inputs and derive the label from the score
    pub fn new(score: f64, confidence: f64) -> Self {
        let score = score.clamp(-1.0, 1.0);

        Self {
            score,
            label: SentimentLabel::from_score(score),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicResult {
    pub primary: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    /// Quality in [0, 1]
    pub quality: f64,
    pub sentence_count: usize,
}

/// Inputs of the local relevance heuristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceSignals {
    pub recency: f64,
    pub source_trust: f64,
    pub keyword_match: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceResult {
    /// Relevance in [0, 1]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<RelevanceSignals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Typed payload of one analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisPayload {
    Sentiment(SentimentResult),
    Topic(TopicResult),
    Summary(SummaryResult),
    Relevance(RelevanceResult),
}

impl AnalysisPayload {
    pub fn kind(&self) -> AnalyzerKind {
        match self {
            Self::Sentiment(_) => AnalyzerKind::Sentiment,
            Self::Topic(_) => AnalyzerKind::Topic,
            Self::Summary(_) => AnalyzerKind::Summary,
            Self::Relevance(_) => AnalyzerKind::Relevance,
        }
    }

    /// Contribution of this payload to the combined score, in [0, 1]
    pub fn score_component(&self) -> f64 {
        let value = match self {
            Self::Sentiment(s) => s.score.abs(),
            Self::Topic(t) => t.confidence,
            Self::Summary(s) => s.quality,
            Self::Relevance(r) => r.score,
        };

        value.clamp(0.0, 1.0)
    }
}

/// Result of a single analyzer call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerResult {
    pub payload: AnalysisPayload,
    /// Produced by the local heuristic instead of external inference
    pub used_fallback: bool,
    /// Served from the cache store
    pub cached: bool,
    /// Cost in USD incurred by this call
    pub cost: f64,
    /// Model tier used on the external path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// External call attempts made (0 when no call was made)
    pub attempts: u32,
    pub latency: Duration,
}

impl AnalyzerResult {
    pub fn kind(&self) -> AnalyzerKind {
        self.payload.kind()
    }
}

/// Aggregated annotations for one article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub article_id: String,
    pub sentiment: Option<AnalyzerResult>,
    pub topic: Option<AnalyzerResult>,
    pub summary: Option<AnalyzerResult>,
    pub relevance: Option<AnalyzerResult>,
    /// Weighted aggregate in [0, 1]
    pub combined_score: f64,
    /// Total cost in USD
    pub total_cost: f64,
    pub processing_time: Duration,
    /// Analyzers that produced no result, with the reason
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub degraded: BTreeMap<AnalyzerKind, String>,
}

impl AnalysisResult {
    pub fn get(&self, kind: AnalyzerKind) -> Option<&AnalyzerResult> {
        match kind {
            AnalyzerKind::Sentiment => self.sentiment.as_ref(),
            AnalyzerKind::Topic => self.topic.as_ref(),
            AnalyzerKind::Summary => self.summary.as_ref(),
            AnalyzerKind::Relevance => self.relevance.as_ref(),
        }
    }

    /// All analyzer results that were produced
    pub fn analyzer_results(&self) -> impl Iterator<Item = &AnalyzerResult> {
        AnalyzerKind::ALL.into_iter().filter_map(|kind| self.get(kind))
    }

    pub fn sentiment(&self) -> Option<&SentimentResult> {
        match self.sentiment.as_ref().map(|r| &r.payload) {
            Some(AnalysisPayload::Sentiment(s)) => Some(s),
            _ => None,
        }
    }

    pub fn topic(&self) -> Option<&TopicResult> {
        match self.topic.as_ref().map(|r| &r.payload) {
            Some(AnalysisPayload::Topic(t)) => Some(t),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<&SummaryResult> {
        match self.summary.as_ref().map(|r| &r.payload) {
            Some(AnalysisPayload::Summary(s)) => Some(s),
            _ => None,
        }
    }

    pub fn relevance(&self) -> Option<&RelevanceResult> {
        match self.relevance.as_ref().map(|r| &r.payload) {
            Some(AnalysisPayload::Relevance(r)) => Some(r),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_label_thresholds() {
        assert_eq!(SentimentLabel::from_score(0.1), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(0.09), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.09), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.1), SentimentLabel::Negative);
    }

    #[test]
    fn test_sentiment_result_clamps() {
        let result = SentimentResult::new(1.7, -0.2);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_score_component_uses_absolute_sentiment() {
        let payload = AnalysisPayload::Sentiment(SentimentResult::new(-0.6, 0.8));
        assert!((payload.score_component() - 0.6).abs() < 1e-9);
        assert_eq!(payload.kind(), AnalyzerKind::Sentiment);
    }

    #[test]
    fn test_payload_serde_is_tagged() {
        let payload = AnalysisPayload::Topic(TopicResult {
            primary: "technology".to_string(),
            confidence: 0.8,
            secondary: vec![],
        });

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "topic");
        assert_eq!(json["primary"], "technology");

        let back: AnalysisPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_degraded_map_serializes_with_string_keys() {
        let mut degraded = BTreeMap::new();
        degraded.insert(AnalyzerKind::Summary, "no sentences".to_string());

        let result = AnalysisResult {
            article_id: "a-1".to_string(),
            sentiment: None,
            topic: None,
            summary: None,
            relevance: None,
            combined_score: 0.0,
            total_cost: 0.0,
            processing_time: Duration::from_millis(3),
            degraded,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["degraded"]["summary"], "no sentences");
        assert!(result.is_degraded());
        assert_eq!(result.analyzer_results().count(), 0);
    }
}
