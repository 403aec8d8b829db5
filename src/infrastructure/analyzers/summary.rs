//! Summary analyzer
//!
//! The heuristic ranks sentences by the frequency of the content words
//! they contain and keeps the best ones in document order. Quality is the
//! share of the article's content-word weight that the summary covers.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use super::text::{content_words, parse_json_response, sentences};
use crate::domain::{
    AnalysisOptions, AnalysisPayload, Analyzer, AnalyzerKind, DomainError, SummaryResult,
};

/// Score multiplier for the opening sentence
const LEAD_BONUS: f64 = 1.2;

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: String,
    #[serde(default)]
    quality: Option<f64>,
}

/// Extractive or model-written summary of an article
#[derive(Debug, Clone, Default)]
pub struct SummaryAnalyzer;

impl SummaryAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn frequencies(text: &str) -> HashMap<String, f64> {
        let mut frequencies = HashMap::new();
        for word in content_words(text) {
            *frequencies.entry(word).or_insert(0.0) += 1.0;
        }
        frequencies
    }

    /// Share of the article's content-word weight present in `summary`
    fn coverage(frequencies: &HashMap<String, f64>, summary: &str) -> f64 {
        let total: f64 = frequencies.values().sum();
        if total <= 0.0 {
            return 0.0;
        }

        let covered: HashSet<String> = content_words(summary).into_iter().collect();
        let weight: f64 = covered
            .iter()
            .filter_map(|word| frequencies.get(word))
            .sum();

        (weight / total).clamp(0.0, 1.0)
    }

    fn rank(sentences: &[&str], frequencies: &HashMap<String, f64>) -> Vec<(usize, f64)> {
        let max = frequencies.values().cloned().fold(0.0, f64::max).max(1.0);

        let mut ranked: Vec<(usize, f64)> = sentences
            .iter()
            .enumerate()
            .map(|(index, sentence)| {
                let words = content_words(sentence);
                let weight: f64 = words
                    .iter()
                    .filter_map(|w| frequencies.get(w))
                    .map(|f| f / max)
                    .sum();
                let mut score = weight / (words.len().max(1) as f64).sqrt();
                if index == 0 {
                    score *= LEAD_BONUS;
                }
                (index, score)
            })
            .collect();

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

impl Analyzer for SummaryAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Summary
    }

    fn options_fingerprint(&self, options: &AnalysisOptions) -> String {
        format!(
            "external={};sentences={}",
            options.use_external, options.summary_sentences
        )
    }

    fn max_tokens(&self) -> u32 {
        400
    }

    fn build_prompt(&self, text: &str, options: &AnalysisOptions) -> String {
        format!(
            r#"Summarize the following news article in at most {} sentences. Keep the key facts and do not add information that is not in the article.

Respond with a JSON object only, in this format:
{{"summary": "<summary text>", "quality": <number from 0.0 to 1.0 rating how well the summary covers the article>}}

Article:
{}"#,
            options.summary_sentences.max(1),
            text
        )
    }

    fn parse_response(
        &self,
        response: &str,
        text: &str,
        _options: &AnalysisOptions,
    ) -> Result<AnalysisPayload, DomainError> {
        let parsed: SummaryResponse = parse_json_response(response)
            .map_err(|e| DomainError::invalid_response(self.kind(), e))?;

        let summary = parsed.summary.trim().to_string();
        if summary.is_empty() {
            return Err(DomainError::invalid_response(self.kind(), "empty summary"));
        }

        let quality = match parsed.quality {
            Some(q) if q.is_finite() && (0.0..=1.0).contains(&q) => q,
            Some(q) => {
                return Err(DomainError::invalid_response(
                    self.kind(),
                    format!("quality {} outside [0, 1]", q),
                ))
            }
            None => Self::coverage(&Self::frequencies(text), &summary),
        };

        Ok(AnalysisPayload::Summary(SummaryResult {
            sentence_count: sentences(&summary).len().max(1),
            summary,
            quality,
        }))
    }

    fn fallback(
        &self,
        text: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalysisPayload, DomainError> {
        let all = sentences(text);
        let frequencies = Self::frequencies(text);

        if all.is_empty() || frequencies.is_empty() {
            return Err(DomainError::fallback_exhausted(
                self.kind(),
                "no content sentences to extract",
            ));
        }

        let target = options.summary_sentences.max(1);
        let mut chosen: Vec<usize> = Self::rank(&all, &frequencies)
            .into_iter()
            .take(target)
            .map(|(index, _)| index)
            .collect();
        chosen.sort_unstable();

        let summary = chosen
            .iter()
            .map(|&index| all[index])
            .collect::<Vec<_>>()
            .join(" ");

        Ok(AnalysisPayload::Summary(SummaryResult {
            quality: Self::coverage(&frequencies, &summary),
            sentence_count: chosen.len(),
            summary,
        }))
    }
}
