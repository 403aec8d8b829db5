//! Infrastructure layer - Cache, inference adapters, resilience, analyzers and services

pub mod analyzers;
pub mod cache;
pub mod inference;
pub mod logging;
pub mod observability;
pub mod resilience;
pub mod services;
pub mod usage;
