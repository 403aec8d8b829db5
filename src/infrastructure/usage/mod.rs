//! Cost tracking infrastructure

mod ledger;

pub use ledger::CostLedger;
