//! # Skirmish Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture and scenario helpers
//! - Reproducibility harness for seeded matches
//! - Duel and time-to-kill balance helpers
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod balance;
pub mod fixtures;
pub mod reproducibility;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
