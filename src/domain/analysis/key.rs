//! Deterministic cache identity for analysis results

use sha2::{Digest, Sha256};

use super::AnalyzerKind;

/// Namespace prefix for analysis cache keys
pub const CACHE_NAMESPACE: &str = "analysis";

const OPTIONS_HASH_LEN: usize = 16;

/// Collapse whitespace runs and trim, so layout-only edits hash identically
pub fn normalize_content(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// SHA-256 (hex) of the normalized text
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(normalize_content(text).as_bytes()))
}

/// `(contentHash, analyzerKind, optionsHash)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisKey {
    content_hash: String,
    kind: AnalyzerKind,
    options_hash: String,
}

impl AnalysisKey {
    /// Build a key from raw text and the analyzer's options fingerprint
    pub fn new(text: &str, kind: AnalyzerKind, options_fingerprint: &str) -> Self {
        let digest = hex::encode(Sha256::digest(options_fingerprint.as_bytes()));

        Self {
            content_hash: content_hash(text),
            kind,
            options_hash: digest[..OPTIONS_HASH_LEN].to_string(),
        }
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn kind(&self) -> AnalyzerKind {
        self.kind
    }

    pub fn options_hash(&self) -> &str {
        &self.options_hash
    }

    /// String form used by cache stores
    pub fn as_cache_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            CACHE_NAMESPACE, self.kind, self.content_hash, self.options_hash
        )
    }
}

impl std::fmt::Display for AnalysisKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_cache_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_content() {
        assert_eq!(
            normalize_content("  Hello \n\n world\tagain  "),
            "Hello world again"
        );
    }

    #[test]
    fn test_content_hash_ignores_layout() {
        assert_eq!(content_hash("a  b\nc"), content_hash("a b c"));
        assert_ne!(content_hash("a b c"), content_hash("a b d"));
        assert_eq!(content_hash("x").len(), 64);
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = AnalysisKey::new("Some text", AnalyzerKind::Topic, "external=true");
        let b = AnalysisKey::new("Some   text", AnalyzerKind::Topic, "external=true");
        assert_eq!(a, b);
        assert_eq!(a.options_hash().len(), 16);
    }

    #[test]
    fn test_key_varies_by_kind_and_options() {
        let base = AnalysisKey::new("Some text", AnalyzerKind::Topic, "external=true");
        let other_kind = AnalysisKey::new("Some text", AnalyzerKind::Summary, "external=true");
        let other_options = AnalysisKey::new("Some text", AnalyzerKind::Topic, "external=false");

        assert_ne!(base.as_cache_key(), other_kind.as_cache_key());
        assert_ne!(base.as_cache_key(), other_options.as_cache_key());
    }

    #[test]
    fn test_cache_key_format() {
        let key = AnalysisKey::new("text", AnalyzerKind::Sentiment, "");
        let rendered = key.as_cache_key();
        assert!(rendered.starts_with("analysis:sentiment:"));
        assert_eq!(rendered.split(':').count(), 4);
    }
}
