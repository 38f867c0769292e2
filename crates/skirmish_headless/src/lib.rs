//! Headless match runner for balance testing and CI verification.
//!
//! This crate plays lane skirmish matches without any presentation layer:
//!
//! - **Single matches**: one seeded match, reported as [`MatchMetrics`]
//! - **Batch runs**: many seeds in parallel (rayon), written as
//!   [`BatchResults`] JSON with an aggregate [`BatchSummary`]
//! - **Custom inputs**: RON balance tables and RON/JSON obstacle lists
//!
//! # Example
//!
//! ```bash
//! cargo run -p skirmish_headless -- run --seed 3
//! cargo run -p skirmish_headless -- batch --count 500 --output results/
//! ```

pub mod batch;
pub mod error;
pub mod inputs;
pub mod metrics;
pub mod runner;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use error::{HeadlessError, Result};
pub use inputs::{load_balance, load_obstacles};
pub use metrics::{BatchSummary, MatchMetrics, MatchOutcome, MetricsCollector, TeamMetrics};
pub use runner::{run_match, MatchConfig};
