//! Domain layer - types and contracts of the enrichment engine

pub mod analysis;
pub mod article;
pub mod cache;
pub mod error;
pub mod inference;
pub mod usage;

pub use analysis::{
    AnalysisKey, AnalysisOptions, AnalysisPayload, AnalysisResult, Analyzer, AnalyzerKind,
    AnalyzerResult, BatchOutcome, BatchStats, RelevanceResult, RelevanceSignals, ScoreWeights,
    SentimentLabel, SentimentResult, SummaryResult, TopicResult,
};
pub use article::Article;
pub use error::DomainError;
pub use inference::{Completion, InferenceClient, InferenceError, Usage};
pub use usage::{CostModel, CostRecord, CostSummary};
