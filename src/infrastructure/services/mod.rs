//! Infrastructure services

mod batch;
mod orchestrator;

pub use batch::BatchCoordinator;
pub use orchestrator::EnrichmentOrchestrator;
