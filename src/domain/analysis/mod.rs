//! Analysis domain - analyzer contract, keys, options and results

mod analyzer;
mod batch;
mod key;
mod kind;
mod options;
mod result;
mod score;

pub use analyzer::Analyzer;
pub use batch::{BatchOutcome, BatchStats};
pub use key::{content_hash, normalize_content, AnalysisKey, CACHE_NAMESPACE};
pub use kind::AnalyzerKind;
pub use options::AnalysisOptions;
pub use result::{
    AnalysisPayload, AnalysisResult, AnalyzerResult, RelevanceResult, RelevanceSignals,
    SentimentLabel, SentimentResult, SummaryResult, TopicResult,
};
pub use score::ScoreWeights;
