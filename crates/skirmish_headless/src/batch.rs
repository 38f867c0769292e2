//! Batch match runner for balance testing.
//!
//! Runs many seeds of the same matchup in parallel using rayon and
//! collects their metrics into one result file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use skirmish_core::data::BalanceConfig;
use skirmish_core::obstacles::Obstacle;
use tracing::{debug, info};

use crate::error::{HeadlessError, Result};
use crate::metrics::{BatchSummary, MatchMetrics};
use crate::runner::{run_match, MatchConfig};

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of matches to run.
    pub match_count: u32,
    /// Seed of the first match; the rest follow consecutively.
    pub seed_start: u64,
    /// Maximum parallel matches (0 = rayon default).
    pub parallel: u32,
    /// Per-match options; the seed is overridden.
    pub match_config: MatchConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            match_count: 100,
            seed_start: 0,
            parallel: 0,
            match_config: MatchConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Create config for `match_count` matches.
    pub fn new(match_count: u32) -> Self {
        Self {
            match_count,
            ..Default::default()
        }
    }

    /// Set seed start.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the per-match time limit.
    pub fn with_max_seconds(mut self, max_seconds: f32) -> Self {
        self.match_config.max_seconds = max_seconds;
        self
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual match metrics, in seed order.
    pub matches: Vec<MatchMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total wall-clock runtime.
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| HeadlessError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| HeadlessError::json(path, e))?;
        std::fs::write(path, json).map_err(|e| HeadlessError::io(path, e))
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| HeadlessError::io(path, e))?;
        serde_json::from_str(&json).map_err(|e| HeadlessError::json(path, e))
    }

    /// Default file name inside an output directory.
    #[must_use]
    pub fn file_in(dir: &Path, config: &BatchConfig) -> PathBuf {
        dir.join(format!(
            "batch_{}_{}.json",
            config.seed_start, config.match_count
        ))
    }
}

/// Run a batch of matches.
pub fn run_batch(config: BatchConfig, balance: &BalanceConfig, obstacles: &[Obstacle]) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        "Starting batch run: {} matches from seed {}",
        config.match_count, config.seed_start
    );

    if config.parallel > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let matches: Vec<MatchMetrics> = (0..config.match_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            let metrics = run_match(&config.match_config.with_seed(seed), balance, obstacles);

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % 10 == 0 {
                debug!("Progress: {}/{}", done, config.match_count);
            }
            metrics
        })
        .collect();

    let summary = BatchSummary::from_matches(&matches);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} matches in {:.1}s ({:.1} matches/sec)",
        matches.len(),
        duration_seconds,
        matches.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        config,
        matches,
        summary,
        duration_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick(count: u32) -> BatchConfig {
        BatchConfig::new(count).with_seed(40).with_max_seconds(3.0)
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(500).with_seed(12345).with_max_seconds(60.0);
        assert_eq!(config.match_count, 500);
        assert_eq!(config.seed_start, 12345);
        assert!((config.match_config.max_seconds - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_run_batch_small() {
        let results = run_batch(quick(4), &BalanceConfig::default(), &[]);

        assert_eq!(results.matches.len(), 4);
        assert_eq!(results.summary.total_matches, 4);
        let seeds: Vec<u64> = results.matches.iter().map(|m| m.seed).collect();
        assert_eq!(seeds, vec![40, 41, 42, 43]);
    }

    #[test]
    fn test_batch_results_save_load() {
        let config = quick(2);
        let results = run_batch(config.clone(), &BalanceConfig::default(), &[]);

        let dir = tempfile::tempdir().unwrap();
        let path = BatchResults::file_in(&dir.path().join("nested"), &config);

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.matches.len(), 2);
        assert_eq!(loaded.config.seed_start, 40);
        assert_eq!(loaded.summary.total_matches, 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BatchResults::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, HeadlessError::Io { .. }));
    }
}
