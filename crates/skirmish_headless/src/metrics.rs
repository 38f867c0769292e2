//! Match metrics collection for balance analysis.
//!
//! A [`MetricsCollector`] watches the [`FrameEvents`] of one match and folds
//! them into a serializable [`MatchMetrics`]; [`BatchSummary`] aggregates
//! many of those.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use skirmish_core::economy::Upgrades;
use skirmish_core::events::FrameEvents;
use skirmish_core::factions::{PerTeam, Team};
use skirmish_core::registry::EntityKind;
use skirmish_core::simulation::{MatchPhase, Simulation};

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// A base was destroyed.
    BaseDestroyed,
    /// The time limit ran out first.
    #[default]
    TimeLimit,
}

/// Complete metrics for a single match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Random seed used.
    pub seed: u64,
    /// Match time at the end, in time-units.
    pub duration: f32,
    /// Frames simulated.
    pub frames: u64,
    /// Winning faction (`None` when the time limit ran out).
    pub winner: Option<Team>,
    /// How the match ended.
    pub outcome: MatchOutcome,
    /// Match time of the first unit death.
    pub first_blood: Option<f32>,
    /// Per-faction metrics.
    pub teams: PerTeam<TeamMetrics>,
}

/// Metrics for one faction in a match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamMetrics {
    /// Units spawned by kind id.
    pub units_spawned: HashMap<String, u32>,
    /// Units lost by kind id.
    pub units_lost: HashMap<String, u32>,
    /// Enemy units killed.
    pub kills: u32,
    /// Damage inflicted on the other faction.
    pub damage_dealt: f64,
    /// Damage taken by this faction's units and base.
    pub damage_taken: f64,
    /// Orbital strikes landed.
    pub strikes: u32,
    /// Entries caught by those strikes.
    pub strike_hits: u32,
    /// Largest number of live units at once.
    pub peak_army: u32,
    /// Upgrade levels at the end.
    pub upgrades: Upgrades,
    /// Money at the end.
    pub final_money: f32,
    /// Base health at the end.
    pub final_base_health: f32,
    /// Kills per loss (at least one loss assumed).
    pub kd_ratio: f64,
}

impl TeamMetrics {
    /// Total units spawned.
    #[must_use]
    pub fn total_spawned(&self) -> u32 {
        self.units_spawned.values().sum()
    }

    /// Total units lost.
    #[must_use]
    pub fn total_lost(&self) -> u32 {
        self.units_lost.values().sum()
    }

    fn calculate_derived_stats(&mut self) {
        // Flawless teams count as one loss.
        self.kd_ratio = f64::from(self.kills) / f64::from(self.total_lost().max(1));
    }
}

/// Metrics collector that tracks events during a match.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    metrics: MatchMetrics,
}

impl MetricsCollector {
    /// Create a collector for a match played with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            metrics: MatchMetrics {
                seed,
                ..Default::default()
            },
        }
    }

    /// Fold one frame's events in; `clock` is the match time after the frame.
    pub fn record(&mut self, clock: f32, events: &FrameEvents) {
        let teams = &mut self.metrics.teams;

        for spawn in &events.spawned {
            *teams[spawn.team]
                .units_spawned
                .entry(spawn.kind.id().to_string())
                .or_default() += 1;
        }

        for hit in &events.damage {
            let amount = f64::from(hit.amount);
            teams[hit.team].damage_taken += amount;
            teams[hit.team.opponent()].damage_dealt += amount;
        }

        for death in &events.deaths {
            let EntityKind::Unit(kind) = death.kind else {
                continue;
            };
            *teams[death.team]
                .units_lost
                .entry(kind.id().to_string())
                .or_default() += 1;
            teams[death.team.opponent()].kills += 1;
            self.metrics.first_blood.get_or_insert(clock);
        }

        for strike in &events.strikes {
            teams[strike.team].strikes += 1;
            teams[strike.team].strike_hits += strike.hits as u32;
        }
    }

    /// Track army sizes after a frame.
    pub fn sample(&mut self, sim: &Simulation) {
        for team in Team::ALL {
            let army = sim.unit_count(team) as u32;
            let peak = &mut self.metrics.teams[team].peak_army;
            *peak = (*peak).max(army);
        }
    }

    /// Close the match and return its metrics.
    #[must_use]
    pub fn finish(mut self, sim: &Simulation) -> MatchMetrics {
        self.metrics.duration = sim.clock();
        self.metrics.frames = sim.frame();
        match sim.phase() {
            MatchPhase::Ended { winner } => {
                self.metrics.winner = Some(winner);
                self.metrics.outcome = MatchOutcome::BaseDestroyed;
            }
            MatchPhase::Playing => {
                self.metrics.winner = None;
                self.metrics.outcome = MatchOutcome::TimeLimit;
            }
        }
        for team in Team::ALL {
            let metrics = &mut self.metrics.teams[team];
            metrics.upgrades = sim.economy().upgrades(team);
            metrics.final_money = sim.economy().money(team);
            metrics.final_base_health = sim.base_health(team);
            metrics.calculate_derived_stats();
        }
        self.metrics
    }
}

/// Summary statistics across many matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches played.
    pub total_matches: u32,
    /// Matches won by each faction.
    pub wins: PerTeam<u32>,
    /// Win rate of each faction.
    pub win_rates: PerTeam<f64>,
    /// Matches that hit the time limit.
    pub draws: u32,
    /// Average match duration.
    pub avg_duration: f64,
    /// Shortest match.
    pub min_duration: f32,
    /// Longest match.
    pub max_duration: f32,
    /// Average units spawned per match.
    pub avg_units_spawned: PerTeam<f64>,
    /// Average damage dealt per match.
    pub avg_damage_dealt: PerTeam<f64>,
    /// Average K/D ratio.
    pub avg_kd_ratio: PerTeam<f64>,
}

impl BatchSummary {
    /// Calculate a summary from a list of match metrics.
    #[must_use]
    pub fn from_matches(matches: &[MatchMetrics]) -> Self {
        if matches.is_empty() {
            return Self::default();
        }

        let count = matches.len() as f64;
        let mut summary = Self {
            total_matches: matches.len() as u32,
            min_duration: f32::MAX,
            ..Default::default()
        };

        let mut duration_sum = 0.0;

        for game in matches {
            duration_sum += f64::from(game.duration);
            summary.min_duration = summary.min_duration.min(game.duration);
            summary.max_duration = summary.max_duration.max(game.duration);

            match game.winner {
                Some(team) => summary.wins[team] += 1,
                None => summary.draws += 1,
            }

            for team in Team::ALL {
                let metrics = &game.teams[team];
                summary.avg_units_spawned[team] += f64::from(metrics.total_spawned());
                summary.avg_damage_dealt[team] += metrics.damage_dealt;
                summary.avg_kd_ratio[team] += metrics.kd_ratio;
            }
        }

        summary.avg_duration = duration_sum / count;
        for team in Team::ALL {
            summary.win_rates[team] = f64::from(summary.wins[team]) / count;
            summary.avg_units_spawned[team] /= count;
            summary.avg_damage_dealt[team] /= count;
            summary.avg_kd_ratio[team] /= count;
        }

        summary
    }

    /// Check if both win rates are within `threshold` of each other's share
    /// of decided matches.
    #[must_use]
    pub fn is_balanced(&self, threshold: f64) -> bool {
        let decided = self.wins.red + self.wins.blue;
        if decided == 0 {
            return true;
        }
        let red_share = f64::from(self.wins.red) / f64::from(decided);
        (red_share - 0.5).abs() <= threshold
    }

    /// The faction winning more than `0.5 + threshold` of decided matches.
    #[must_use]
    pub fn dominant_team(&self, threshold: f64) -> Option<Team> {
        let decided = self.wins.red + self.wins.blue;
        if decided == 0 {
            return None;
        }
        Team::ALL
            .into_iter()
            .find(|&team| f64::from(self.wins[team]) / f64::from(decided) > 0.5 + threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::data::UnitKind;
    use skirmish_core::events::{DamageEvent, DeathEvent, SpawnEvent};
    use skirmish_core::factions::Lane;
    use skirmish_test_utils::fixtures::{place, quiet_sim};

    fn decided(winner: Option<Team>, duration: f32) -> MatchMetrics {
        MatchMetrics {
            winner,
            duration,
            outcome: if winner.is_some() {
                MatchOutcome::BaseDestroyed
            } else {
                MatchOutcome::TimeLimit
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_collector_attributes_events() {
        let mut sim = quiet_sim(3);
        let red = place(&mut sim, Team::Red, UnitKind::Ranger, 0.0, 0.0);

        let mut events = FrameEvents::default();
        events.spawned.push(SpawnEvent {
            id: red,
            team: Team::Red,
            kind: UnitKind::Ranger,
            lane: Lane::Mid,
        });
        events.damage.push(DamageEvent {
            id: red,
            team: Team::Red,
            amount: 40.0,
            remaining: 0.0,
        });
        events.deaths.push(DeathEvent {
            id: red,
            position: glam::Vec3::ZERO,
            color: Team::Red.color(),
            team: Team::Red,
            kind: EntityKind::Unit(UnitKind::Ranger),
        });

        let mut collector = MetricsCollector::new(3);
        collector.record(2.5, &events);
        let metrics = collector.finish(&sim);

        assert_eq!(metrics.teams.red.units_spawned["ranger"], 1);
        assert_eq!(metrics.teams.red.units_lost["ranger"], 1);
        assert_eq!(metrics.teams.blue.kills, 1);
        assert!((metrics.teams.blue.damage_dealt - 40.0).abs() < 1e-9);
        assert!((metrics.teams.red.damage_taken - 40.0).abs() < 1e-9);
        assert_eq!(metrics.first_blood, Some(2.5));
        assert!((metrics.teams.blue.kd_ratio - 1.0).abs() < 1e-9);
        assert!((metrics.teams.red.kd_ratio - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_unfinished_match_is_a_time_limit_draw() {
        let sim = quiet_sim(1);
        let metrics = MetricsCollector::new(1).finish(&sim);
        assert_eq!(metrics.winner, None);
        assert_eq!(metrics.outcome, MatchOutcome::TimeLimit);
        assert!(metrics.teams.red.final_base_health > 0.0);
    }

    #[test]
    fn test_summary_from_matches() {
        let matches = vec![
            decided(Some(Team::Red), 100.0),
            decided(Some(Team::Red), 200.0),
            decided(Some(Team::Blue), 300.0),
            decided(None, 600.0),
        ];

        let summary = BatchSummary::from_matches(&matches);
        assert_eq!(summary.total_matches, 4);
        assert_eq!(summary.wins.red, 2);
        assert_eq!(summary.wins.blue, 1);
        assert_eq!(summary.draws, 1);
        assert!((summary.win_rates.red - 0.5).abs() < 1e-9);
        assert!((summary.avg_duration - 300.0).abs() < 1e-9);
        assert!((summary.min_duration - 100.0).abs() < f32::EPSILON);
        assert!((summary.max_duration - 600.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_balance_checks() {
        let lopsided: Vec<_> = (0..9)
            .map(|i| decided(Some(if i < 8 { Team::Blue } else { Team::Red }), 10.0))
            .collect();
        let summary = BatchSummary::from_matches(&lopsided);
        assert!(!summary.is_balanced(0.1));
        assert_eq!(summary.dominant_team(0.1), Some(Team::Blue));

        let even = BatchSummary::from_matches(&[
            decided(Some(Team::Red), 10.0),
            decided(Some(Team::Blue), 10.0),
        ]);
        assert!(even.is_balanced(0.05));
        assert_eq!(even.dominant_team(0.05), None);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_matches(&[]);
        assert_eq!(summary.total_matches, 0);
        assert!(summary.is_balanced(0.0));
    }
}
