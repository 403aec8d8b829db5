use std::fmt::Debug;

use super::{AnalysisOptions, AnalysisPayload, AnalyzerKind};
use crate::domain::DomainError;

/// Capability set shared by every analyzer kind
///
/// An analyzer knows how to phrase its task for external inference, how to
/// validate the answer, and how to approximate the answer locally. Caching,
/// rate limiting, retries and cost accounting are applied around it by the
/// analysis pipeline.
pub trait Analyzer: Send + Sync + Debug {
    fn kind(&self) -> AnalyzerKind;

    /// Options this analyzer reads, rendered deterministically for cache keys
    fn options_fingerprint(&self, options: &AnalysisOptions) -> String {
        format!("external={}", options.use_external)
    }

    /// Output token budget for the external call
    fn max_tokens(&self) -> u32;

    /// Prompt for the external path
    fn build_prompt(&self, text: &str, options: &AnalysisOptions) -> String;

    /// Parse and validate an external response
    fn parse_response(
        &self,
        response: &str,
        text: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalysisPayload, DomainError>;

    /// Local heuristic used when the external path is unavailable
    fn fallback(&self, text: &str, options: &AnalysisOptions)
        -> Result<AnalysisPayload, DomainError>;
}
