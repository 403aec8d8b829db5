//! Cache domain - key/value store abstraction for analysis results

mod repository;

pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
