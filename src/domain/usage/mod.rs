//! Cost accounting domain
//!
//! Model pricing, per-task model tier selection and cost records.

mod cost_model;
mod pricing;
mod record;

pub use cost_model::{CostConfig, CostModel, PricingConfig};
pub use pricing::{default_model_pricing, ModelPricing};
pub use record::{CostRecord, CostSummary, ModelUsage};
