//! Sentiment analyzer

use serde::Deserialize;
use tracing::debug;

use super::lexicon::{INTENSIFIERS, NEGATIVE_WORDS, NEGATORS, POSITIVE_WORDS};
use super::text::{parse_json_response, tokenize};
use crate::domain::{
    AnalysisOptions, AnalysisPayload, Analyzer, AnalyzerKind, DomainError, SentimentResult,
};

/// Tokens before a sentiment word that a negator may occupy
const NEGATION_SCOPE: usize = 3;

/// Sentiment words per token at which heuristic confidence saturates
const CONFIDENT_DENSITY: f64 = 0.2;

/// Default confidence when the model omits it
const DEFAULT_EXTERNAL_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Deserialize)]
struct SentimentResponse {
    score: f64,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Signed polarity of an article
#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Lexicon polarity with negation and intensifiers
    fn lexicon_score(tokens: &[String]) -> (f64, f64) {
        let mut positive = 0.0;
        let mut negative = 0.0;
        let mut hits = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            let polarity = if POSITIVE_WORDS.contains(token.as_str()) {
                1.0
            } else if NEGATIVE_WORDS.contains(token.as_str()) {
                -1.0
            } else {
                continue;
            };

            let scope = &tokens[i.saturating_sub(NEGATION_SCOPE)..i];
            let negated = scope.iter().any(|t| NEGATORS.contains(t.as_str()));
            let intensity = i
                .checked_sub(1)
                .and_then(|prev| INTENSIFIERS.get(tokens[prev].as_str()))
                .copied()
                .unwrap_or(1.0);

            let value = (if negated { -polarity } else { polarity }) * intensity;
            if value > 0.0 {
                positive += value;
            } else {
                negative -= value;
            }
            hits += 1;
        }

        // The +1 keeps a single stray word from reading as full polarity
        let score = (positive - negative) / (positive + negative + 1.0);
        let density = hits as f64 / tokens.len().max(1) as f64;
        let confidence = (density / CONFIDENT_DENSITY).min(1.0);

        (score, confidence)
    }
}

impl Analyzer for SentimentAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Sentiment
    }

    fn max_tokens(&self) -> u32 {
        60
    }

    fn build_prompt(&self, text: &str, _options: &AnalysisOptions) -> String {
        format!(
            r#"Analyze the overall sentiment of the following news article.

Respond with a JSON object only, in this format:
{{"score": <number from -1.0 (very negative) to 1.0 (very positive)>, "confidence": <number from 0.0 to 1.0>}}

Article:
{}"#,
            text
        )
    }

    fn parse_response(
        &self,
        response: &str,
        _text: &str,
        _options: &AnalysisOptions,
    ) -> Result<AnalysisPayload, DomainError> {
        let parsed: SentimentResponse = parse_json_response(response)
            .map_err(|e| DomainError::invalid_response(self.kind(), e))?;

        if !parsed.score.is_finite() || !(-1.0..=1.0).contains(&parsed.score) {
            return Err(DomainError::invalid_response(
                self.kind(),
                format!("score {} outside [-1, 1]", parsed.score),
            ));
        }

        let confidence = parsed.confidence.unwrap_or(DEFAULT_EXTERNAL_CONFIDENCE);
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(DomainError::invalid_response(
                self.kind(),
                format!("confidence {} outside [0, 1]", confidence),
            ));
        }

        Ok(AnalysisPayload::Sentiment(SentimentResult::new(
            parsed.score,
            confidence,
        )))
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
                "no words to score",
            ));
        }

        let (score, confidence) = Self::lexicon_score(&tokens);
        debug!(score = score, confidence = confidence, "Lexicon sentiment computed");

        Ok(AnalysisPayload::Sentiment(SentimentResult::new(score, confidence)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SentimentLabel;

    fn heuristic(text: &str) -> SentimentResult {
        match SentimentAnalyzer::new()
            .fallback(text, &AnalysisOptions::heuristic_only())
            .unwrap()
        {
            AnalysisPayload::Sentiment(s) => s,
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_positive_text() {
        let result = heuristic("I love this amazing breakthrough in AI!");
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!(result.score > 0.5);
        assert!(result.confidence > 0.0);
    }

    #[test]
    fn test_negative_text() {
        let result = heuristic("The crash caused terrible losses and a deep crisis.");
        assert_eq!(result.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let plain = heuristic("The results were good.");
        let negated = heuristic("The results were not good.");
        assert!(plain.score > 0.0);
        assert!(negated.score < 0.0);
    }

    #[test]
    fn test_intensifier_strengthens_polarity() {
        let plain = heuristic("The launch was good.");
        let intense = heuristic("The launch was extremely good.");
        assert!(intense.score > plain.score);
    }

    #[test]
    fn test_neutral_text() {
        let result = heuristic("The committee met on Tuesday to review the schedule.");
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_no_words_exhausts_fallback() {
        let error = SentimentAnalyzer::new()
            .fallback("!!! ... ???", &AnalysisOptions::default())
            .unwrap_err();
        assert!(matches!(error, DomainError::FallbackExhausted { .. }));
    }

    #[test]
    fn test_parse_response() {
        let analyzer = SentimentAnalyzer::new();
        let options = AnalysisOptions::default();

        let payload = analyzer
            .parse_response("{\"score\": -0.6, \"confidence\": 0.9}", "", &options)
            .unwrap();
        assert_eq!(
            payload,
            AnalysisPayload::Sentiment(SentimentResult::new(-0.6, 0.9))
        );

        let payload = analyzer.parse_response("{\"score\": 0.3}", "", &options).unwrap();
        assert_eq!(
            payload,
            AnalysisPayload::Sentiment(SentimentResult::new(0.3, DEFAULT_EXTERNAL_CONFIDENCE))
        );
    }

    #[test]
    fn test_parse_response_rejects_out_of_range() {
        let analyzer = SentimentAnalyzer::new();
        let options = AnalysisOptions::default();

        assert!(analyzer.parse_response("{\"score\": 3.0}", "", &options).is_err());
        assert!(analyzer.parse_response("positive!", "", &options).is_err());
        assert!(analyzer
            .parse_response("{\"score\": 0.1, \"confidence\": 2}", "", &options)
            .is_err());
    }

    #[test]
    fn test_prompt_contains_article() {
        let prompt = SentimentAnalyzer::new().build_prompt("Markets rallied.", &AnalysisOptions::default());
        assert!(prompt.contains("Markets rallied."));
        assert!(prompt.contains("\"score\""));
    }
}
