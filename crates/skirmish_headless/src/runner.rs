//! Single-match runner.
//!
//! Plays one match at a fixed frame step until a base falls or the time
//! limit runs out, collecting [`MatchMetrics`] along the way.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use skirmish_core::data::BalanceConfig;
use skirmish_core::obstacles::Obstacle;
use skirmish_core::simulation::{MatchSettings, Simulation};
use tracing::info;

use crate::metrics::{MatchMetrics, MetricsCollector};

/// Default frame step (60 frames per time-unit).
pub const DEFAULT_FRAME_DELTA: f32 = 1.0 / 60.0;

/// Default time limit: ten minutes of match time.
pub const DEFAULT_MAX_SECONDS: f32 = 600.0;

/// Options for one headless match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Random seed.
    pub seed: u64,
    /// Match time limit.
    pub max_seconds: f32,
    /// Frame step.
    pub frame_delta: f32,
    /// Run the scripted opponent.
    pub opponent_ai: bool,
    /// Run the automated ally in place of a player.
    pub ally_ai: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_seconds: DEFAULT_MAX_SECONDS,
            frame_delta: DEFAULT_FRAME_DELTA,
            opponent_ai: true,
            ally_ai: true,
        }
    }
}

impl MatchConfig {
    /// Same options with a different seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Frames needed to reach the time limit.
    #[must_use]
    pub fn max_frames(&self) -> u64 {
        if self.frame_delta <= 0.0 {
            return 0;
        }
        (self.max_seconds / self.frame_delta).ceil() as u64
    }

    fn settings(&self) -> MatchSettings {
        MatchSettings {
            seed: self.seed,
            opponent_ai: self.opponent_ai,
            ally_ai: self.ally_ai,
        }
    }
}

/// Play one match to completion and return its metrics.
pub fn run_match(config: &MatchConfig, balance: &BalanceConfig, obstacles: &[Obstacle]) -> MatchMetrics {
    let started = Instant::now();
    let mut sim = Simulation::new(balance.clone(), obstacles.to_vec(), config.settings());
    let mut collector = MetricsCollector::new(config.seed);

    for _ in 0..config.max_frames() {
        let events = sim.advance(config.frame_delta);
        collector.record(sim.clock(), &events);
        collector.sample(&sim);
        if !sim.is_playing() {
            break;
        }
    }

    let metrics = collector.finish(&sim);
    info!(
        seed = config.seed,
        winner = ?metrics.winner,
        duration = metrics.duration,
        wall_ms = started.elapsed().as_millis() as u64,
        "Match finished"
    );
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MatchOutcome;
    use skirmish_core::factions::Team;

    #[test]
    fn test_max_frames() {
        let config = MatchConfig {
            max_seconds: 2.0,
            frame_delta: 0.5,
            ..Default::default()
        };
        assert_eq!(config.max_frames(), 4);
        let stalled = MatchConfig {
            frame_delta: 0.0,
            ..Default::default()
        };
        assert_eq!(stalled.max_frames(), 0);
    }

    #[test]
    fn test_short_match_hits_time_limit() {
        let config = MatchConfig {
            seed: 11,
            max_seconds: 5.0,
            ..Default::default()
        };
        let metrics = run_match(&config, &BalanceConfig::default(), &[]);
        assert_eq!(metrics.outcome, MatchOutcome::TimeLimit);
        assert_eq!(metrics.frames, config.max_frames());
        assert!((metrics.duration - 5.0).abs() < 0.05);
    }

    #[test]
    fn test_fragile_base_ends_match_early() {
        let mut balance = BalanceConfig::default();
        balance.base.health = 1.0;
        let config = MatchConfig {
            seed: 2,
            max_seconds: 300.0,
            ..Default::default()
        };

        let metrics = run_match(&config, &balance, &[]);
        assert_eq!(metrics.outcome, MatchOutcome::BaseDestroyed);
        assert!(metrics.winner.is_some());
        assert!(metrics.frames < config.max_frames());
        let loser = metrics.winner.map(Team::opponent).unwrap();
        assert!(metrics.teams[loser].final_base_health <= 0.0);
    }

    #[test]
    fn test_same_seed_same_metrics() {
        let config = MatchConfig {
            seed: 77,
            max_seconds: 20.0,
            ..Default::default()
        };
        let balance = BalanceConfig::default();
        let a = run_match(&config, &balance, &[]);
        let b = run_match(&config, &balance, &[]);
        assert_eq!(a.frames, b.frames);
        assert_eq!(a.teams.red.units_spawned, b.teams.red.units_spawned);
        assert_eq!(a.teams.blue.kills, b.teams.blue.kills);
        assert!((a.teams.red.final_money - b.teams.red.final_money).abs() < f32::EPSILON);
    }
}
