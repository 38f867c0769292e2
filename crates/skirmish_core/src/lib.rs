//! # Skirmish Core
//!
//! Frame-driven simulation core for a two-faction lane skirmish.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No input handling
//! - No IO besides optional balance file loading
//! - No system randomness (one seeded RNG per match)
//!
//! Hosts call [`Simulation::advance`](simulation::Simulation::advance) once
//! per rendered frame and consume the returned events and the read-only
//! views of the registry and effect pools.
//!
//! ## Crate Structure
//!
//! - [`registry`] - Live units and bases keyed by generational ids
//! - [`combat`] - Per-unit targeting, steering and attack state machine
//! - [`turret`] - Stationary base defence
//! - [`projectile`] - Ballistic flight and collision resolution
//! - [`effects`] - Bounded particle and streak pools
//! - [`economy`] / [`director`] - Income, upgrades and scripted spending
//! - [`scheduler`] - Future-timestamp action queue
//! - [`simulation`] - The match context and frame loop
//! - [`data`] - RON-loadable balance tables

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod components;
pub mod data;
pub mod director;
pub mod economy;
pub mod effects;
pub mod error;
pub mod events;
pub mod factions;
pub mod math;
pub mod obstacles;
pub mod projectile;
pub mod registry;
pub mod scheduler;
pub mod simulation;
pub mod turret;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{AgentActivity, AgentState, CombatAgent};
    pub use crate::components::*;
    pub use crate::data::{AttackStyle, BalanceConfig, UnitKind, UnitStats};
    pub use crate::economy::{UpgradeKind, UpgradeMultipliers};
    pub use crate::effects::EffectPools;
    pub use crate::error::{Result, SimError};
    pub use crate::events::{FireKind, FrameEvents};
    pub use crate::factions::{Lane, PerTeam, Team};
    pub use crate::obstacles::{Obstacle, ObstacleShape};
    pub use crate::registry::{EntityId, EntityKind, Registry, RegistryEntry};
    pub use crate::simulation::{MatchPhase, MatchSettings, Simulation};
}
