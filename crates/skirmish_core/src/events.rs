//! Per-frame event contracts consumed by rendering, UI and scoring.
//!
//! The simulation never calls out; everything observable that happened in a
//! frame is returned from [`Simulation::advance`](crate::simulation::Simulation::advance)
//! as one [`FrameEvents`] value.

use glam::Vec3;

use crate::combat::AimWarning;
use crate::data::UnitKind;
use crate::economy::UpgradeKind;
use crate::factions::{Lane, Team};
use crate::registry::{EntityId, EntityKind};

/// What produced a fire event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FireKind {
    /// Instant tracer shot.
    HitScan,
    /// Flame burst.
    Flame,
    /// Completed channeled shot.
    Snipe,
    /// Single splash shell.
    Shell,
    /// One sub-shot of a volley.
    VolleyShot,
    /// Base turret shell.
    Turret,
}

/// An attack was executed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireEvent {
    /// Attack type.
    pub kind: FireKind,
    /// Firing faction.
    pub team: Team,
    /// Muzzle position.
    pub start: Vec3,
    /// Aim point.
    pub target: Vec3,
    /// Team colour.
    pub color: u32,
    /// Damage carried.
    pub damage: f32,
    /// Splash radius (0 for single-target).
    pub splash: f32,
}

/// An entry left the registry through death.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathEvent {
    /// Dead entry.
    pub id: EntityId,
    /// Last position.
    pub position: Vec3,
    /// Team colour.
    pub color: u32,
    /// Owning faction.
    pub team: Team,
    /// Unit kind or base.
    pub kind: EntityKind,
}

/// A base took damage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseDamageEvent {
    /// Faction owning the base.
    pub team: Team,
    /// Health left.
    pub remaining: f32,
}

/// Any entry took damage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    /// Damaged entry.
    pub id: EntityId,
    /// Owning faction.
    pub team: Team,
    /// Damage applied.
    pub amount: f32,
    /// Health left.
    pub remaining: f32,
}

/// Area damage was applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionEvent {
    /// Blast centre.
    pub position: Vec3,
    /// Blast radius.
    pub radius: f32,
    /// Damage per entry caught.
    pub damage: f32,
    /// Attacking faction.
    pub team: Team,
}

/// A unit joined the battle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnEvent {
    /// New entry.
    pub id: EntityId,
    /// Owning faction.
    pub team: Team,
    /// Unit kind.
    pub kind: UnitKind,
    /// Assigned lane.
    pub lane: Lane,
}

/// An upgrade level was bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeEvent {
    /// Buying faction.
    pub team: Team,
    /// Upgrade track.
    pub kind: UpgradeKind,
    /// New level.
    pub level: u32,
}

/// An orbital strike landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeEvent {
    /// Casting faction.
    pub team: Team,
    /// Strike centre.
    pub point: Vec3,
    /// Entries caught in the blast.
    pub hits: usize,
}

/// Everything observable that happened in one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameEvents {
    /// Attacks executed.
    pub fired: Vec<FireEvent>,
    /// Entries that died.
    pub deaths: Vec<DeathEvent>,
    /// Damage taken by bases.
    pub base_damage: Vec<BaseDamageEvent>,
    /// Area damage applications.
    pub explosions: Vec<ExplosionEvent>,
    /// Channeled-shot warning beams.
    pub aim_warnings: Vec<AimWarning>,
    /// Damage taken by any entry.
    pub damage: Vec<DamageEvent>,
    /// Units spawned.
    pub spawned: Vec<SpawnEvent>,
    /// Upgrades bought.
    pub upgrades: Vec<UpgradeEvent>,
    /// Orbital strikes landed.
    pub strikes: Vec<StrikeEvent>,
    /// Faction whose base was destroyed this frame.
    pub base_destroyed: Option<Team>,
}

impl FrameEvents {
    /// Check if nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
            && self.deaths.is_empty()
            && self.base_damage.is_empty()
            && self.explosions.is_empty()
            && self.aim_warnings.is_empty()
            && self.damage.is_empty()
            && self.spawned.is_empty()
            && self.upgrades.is_empty()
            && self.strikes.is_empty()
            && self.base_destroyed.is_none()
    }

    /// Total damage dealt by `team` this frame.
    #[must_use]
    pub fn damage_dealt_by(&self, team: Team) -> f32 {
        self.damage
            .iter()
            .filter(|event| event.team != team)
            .map(|event| event.amount)
            .sum()
    }
}
