use serde::{Deserialize, Serialize};

use super::AnalyzerKind;
use crate::domain::DomainError;

/// Weights of the combined score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_relevance")]
    pub relevance: f64,
    #[serde(default = "default_topic")]
    pub topic: f64,
    #[serde(default = "default_sentiment")]
    pub sentiment: f64,
    #[serde(default = "default_summary")]
    pub summary: f64,
}

fn default_relevance() -> f64 {
    0.40
}

fn default_topic() -> f64 {
    0.25
}

fn default_sentiment() -> f64 {
    0.15
}

fn default_summary() -> f64 {
    0.20
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            relevance: default_relevance(),
            topic: default_topic(),
            sentiment: default_sentiment(),
            summary: default_summary(),
        }
    }
}

impl ScoreWeights {
    pub fn new(relevance: f64, topic: f64, sentiment: f64, summary: f64) -> Self {
        Self {
            relevance,
            topic,
            sentiment,
            summary,
        }
    }

    pub fn weight(&self, kind: AnalyzerKind) -> f64 {
        match kind {
            AnalyzerKind::Relevance => self.relevance,
            AnalyzerKind::Topic => self.topic,
            AnalyzerKind::Sentiment => self.sentiment,
            AnalyzerKind::Summary => self.summary,
        }
    }

    pub fn sum(&self) -> f64 {
        self.relevance + self.topic + self.sentiment + self.summary
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        for kind in AnalyzerKind::ALL {
            let weight = self.weight(kind);
            if !weight.is_finite() || weight < 0.0 {
                return Err(DomainError::configuration(format!(
                    "Score weight for {} must be a non-negative number, got {}",
                    kind, weight
                )));
            }
        }

        if self.sum() <= 0.0 {
            return Err(DomainError::configuration(
                "Score weights must not all be zero",
            ));
        }

        Ok(())
    }

    /// Scale the weights so they sum to 1
    pub fn normalized(&self) -> Self {
        let sum = self.sum();

        if sum <= 0.0 {
            return Self::default();
        }

        Self {
            relevance: self.relevance / sum,
            topic: self.topic / sum,
            sentiment: self.sentiment / sum,
            summary: self.summary / sum,
        }
    }

    /// Weighted mean of the available components, renormalized over the
    /// kinds that are present. Always in [0, 1].
    pub fn combine<I>(&self, components: I) -> f64
    where
        I: IntoIterator<Item = (AnalyzerKind, f64)>,
    {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for (kind, value) in components {
            let weight = self.weight(kind).max(0.0);
            let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };

            weighted += weight * value;
            total_weight += weight;
        }

        if total_weight <= 0.0 {
            return 0.0;
        }

        (weighted / total_weight).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((ScoreWeights::default().sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalized() {
        let weights = ScoreWeights::new(2.0, 1.0, 1.0, 0.0).normalized();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
        assert!((weights.relevance - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_combine_all_components() {
        let weights = ScoreWeights::default();
        let score = weights.combine([
            (AnalyzerKind::Relevance, 1.0),
            (AnalyzerKind::Topic, 1.0),
            (AnalyzerKind::Sentiment, 1.0),
            (AnalyzerKind::Summary, 1.0),
        ]);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_combine_renormalizes_missing_components() {
        let weights = ScoreWeights::default();
        let score = weights.combine([(AnalyzerKind::Relevance, 0.8)]);
        assert!((score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_combine_stays_in_range() {
        let weights = ScoreWeights::default();
        let score = weights.combine([
            (AnalyzerKind::Relevance, 7.0),
            (AnalyzerKind::Topic, -3.0),
            (AnalyzerKind::Sentiment, f64::NAN),
        ]);
        assert!((0.0..=1.0).contains(&score));
        assert_eq!(weights.combine(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_validate_rejects_negative_and_zero() {
        assert!(ScoreWeights::new(-0.1, 0.5, 0.3, 0.3).validate().is_err());
        assert!(ScoreWeights::new(0.0, 0.0, 0.0, 0.0).validate().is_err());
        assert!(ScoreWeights::default().validate().is_ok());
    }
}
