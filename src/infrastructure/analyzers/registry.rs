use std::collections::BTreeMap;
use std::sync::Arc;

use super::{RelevanceAnalyzer, SentimentAnalyzer, SummaryAnalyzer, TopicAnalyzer};
use crate::domain::{Analyzer, AnalyzerKind, DomainError};

/// Analyzer implementations keyed by kind
#[derive(Debug, Clone, Default)]
pub struct AnalyzerRegistry {
    analyzers: BTreeMap<AnalyzerKind, Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in analyzer for every kind
    pub fn standard() -> Self {
        Self::new()
            .with(Arc::new(SentimentAnalyzer::new()))
            .with(Arc::new(TopicAnalyzer::new()))
            .with(Arc::new(SummaryAnalyzer::new()))
            .with(Arc::new(RelevanceAnalyzer::new()))
    }

    /// Register an analyzer, replacing any previous one of the same kind
    pub fn with(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.register(analyzer);
        self
    }

    pub fn register(&mut self, analyzer: Arc<dyn Analyzer>) {
        self.analyzers.insert(analyzer.kind(), analyzer);
    }

    pub fn get(&self, kind: AnalyzerKind) -> Option<&Arc<dyn Analyzer>> {
        self.analyzers.get(&kind)
    }

    /// Look up an analyzer, failing when the kind is missing
    pub fn require(&self, kind: AnalyzerKind) -> Result<&Arc<dyn Analyzer>, DomainError> {
        self.get(kind)
            .ok_or_else(|| DomainError::internal(format!("No analyzer registered for {}", kind)))
    }

    pub fn kinds(&self) -> impl Iterator<Item = AnalyzerKind> + '_ {
        self.analyzers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_all_kinds() {
        let registry = AnalyzerRegistry::standard();

        assert_eq!(registry.len(), AnalyzerKind::ALL.len());
        for kind in AnalyzerKind::ALL {
            assert_eq!(registry.require(kind).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_missing_kind_is_internal_error() {
        let registry = AnalyzerRegistry::new().with(Arc::new(TopicAnalyzer::new()));

        assert!(registry.get(AnalyzerKind::Sentiment).is_none());
        assert!(matches!(
            registry.require(AnalyzerKind::Sentiment),
            Err(DomainError::Internal { .. })
        ));
        assert_eq!(registry.kinds().collect::<Vec<_>>(), vec![AnalyzerKind::Topic]);
    }
}
