//! Test fixtures and helpers.
//!
//! Pre-built matches and frame-stepping helpers for consistent testing.

use glam::Vec3;
use skirmish_core::data::{BalanceConfig, UnitKind};
use skirmish_core::events::FrameEvents;
use skirmish_core::factions::{Lane, Team};
use skirmish_core::obstacles::{Obstacle, ObstacleShape};
use skirmish_core::registry::EntityId;
use skirmish_core::simulation::{MatchSettings, Simulation};

/// One frame at the reference 60 Hz.
pub const FRAME: f32 = 1.0 / 60.0;

/// Settings with both scripted agents switched off.
#[must_use]
pub fn manual_settings(seed: u64) -> MatchSettings {
    MatchSettings {
        seed,
        opponent_ai: false,
        ally_ai: false,
    }
}

/// A match with default balance, no obstacles and no scripted spending.
#[must_use]
pub fn quiet_sim(seed: u64) -> Simulation {
    Simulation::new(BalanceConfig::default(), Vec::new(), manual_settings(seed))
}

/// A match with both scripted agents running.
#[must_use]
pub fn ai_sim(seed: u64, obstacles: Vec<Obstacle>) -> Simulation {
    Simulation::new(
        BalanceConfig::default(),
        obstacles,
        MatchSettings {
            seed,
            opponent_ai: true,
            ally_ai: true,
        },
    )
}

/// Default balance with a different starting purse for both factions.
#[must_use]
pub fn config_with_money(start_money: f32) -> BalanceConfig {
    let mut config = BalanceConfig::default();
    config.economy.start_money = start_money;
    config
}

/// A handful of obstacles of every shape scattered around mid field.
#[must_use]
pub fn sample_obstacles() -> Vec<Obstacle> {
    vec![
        Obstacle::new(-60.0, 60.0, 10.0, ObstacleShape::Rock),
        Obstacle::new(40.0, -70.0, 25.0, ObstacleShape::Mountain),
        Obstacle::new(120.0, 120.0, 8.0, ObstacleShape::Ruin),
        Obstacle::new(-150.0, -120.0, 6.0, ObstacleShape::Ruin),
    ]
}

/// Spawn a unit on the mid lane at `(x, 0, z)`.
pub fn place(sim: &mut Simulation, team: Team, kind: UnitKind, x: f32, z: f32) -> EntityId {
    sim.spawn_unit_at(team, kind, Lane::Mid, Vec3::new(x, 0.0, z))
}

/// Advance `frames` frames, collecting every frame's events.
pub fn run_frames(sim: &mut Simulation, frames: usize) -> Vec<FrameEvents> {
    (0..frames).map(|_| sim.advance(FRAME)).collect()
}

/// Advance for `seconds` of match time, discarding events.
pub fn run_for(sim: &mut Simulation, seconds: f32) {
    let frames = (seconds / FRAME).ceil() as usize;
    for _ in 0..frames {
        sim.advance(FRAME);
    }
}

/// Advance until `done` holds for the frame just simulated, up to
/// `max_frames`. Returns the 1-based frame count at which it held.
pub fn run_until<F>(sim: &mut Simulation, max_frames: usize, mut done: F) -> Option<usize>
where
    F: FnMut(&Simulation, &FrameEvents) -> bool,
{
    for frame in 1..=max_frames {
        let events = sim.advance(FRAME);
        if done(sim, &events) {
            return Some(frame);
        }
    }
    None
}

/// Planar distance between two live entries.
#[must_use]
pub fn distance_between(sim: &Simulation, a: EntityId, b: EntityId) -> Option<f32> {
    let a = sim.registry().get(a)?.position;
    let b = sim.registry().get(b)?.position;
    Some(Vec3::new(a.x - b.x, 0.0, a.z - b.z).length())
}
