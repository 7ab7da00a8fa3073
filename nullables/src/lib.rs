//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator the governance keeper reaches through a trait (the
//! key-value store, the coin subsystem, the stake subsystem) has an in-memory
//! double here that:
//! - returns deterministic values
//! - can be controlled programmatically
//! - never touches the filesystem
//!
//! Usage: swap real implementations for nullables in tests.

pub mod bank;
pub mod stake;
pub mod store;

pub use bank::NullBank;
pub use stake::NullStake;
pub use store::NullKvStore;
