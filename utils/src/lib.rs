//! Shared utilities for the SimpleGov ledger.

pub mod stats;

pub use stats::StatsCounter;
