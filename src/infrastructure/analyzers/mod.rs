//! Analyzer implementations and the pipeline that runs them

pub mod lexicon;
mod pipeline;
mod registry;
mod relevance;
mod sentiment;
mod summary;
pub mod text;
mod topic;

pub use pipeline::{AnalysisPipeline, PipelineConfig, ResolutionPath};
pub use registry::AnalyzerRegistry;
pub use relevance::RelevanceAnalyzer;
pub use sentiment::SentimentAnalyzer;
pub use summary::SummaryAnalyzer;
pub use topic::TopicAnalyzer;
