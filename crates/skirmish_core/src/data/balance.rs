//! Balance tables for a skirmish.
//!
//! Every tunable number the simulation reads lives here, grouped by the system
//! that consumes it. [`BalanceConfig::default`] and the embedded
//! `data/balance.ron` carry identical values; a RON file may override any
//! subset of sections.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::unit_data::{AttackStyle, Ballistics, UnitKind, UnitRoster};
use crate::error::{Result, SimError};
use crate::factions::{Lane, PerTeam, Team};

const EMBEDDED_BALANCE: &str = include_str!("../../data/balance.ron");

/// Complete tuning for one match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Per-kind unit stats.
    pub units: UnitRoster,
    /// Base and lane placement.
    pub battlefield: BattlefieldConfig,
    /// Base turret stats.
    pub base: BaseConfig,
    /// Combat agent behaviour.
    pub agent: AgentTuning,
    /// Projectile collision rules.
    pub projectiles: ProjectileTuning,
    /// Effect pool sizes and spawn parameters.
    pub effects: EffectConfig,
    /// Money and income schedule.
    pub economy: EconomyConfig,
    /// Scripted spending policy.
    pub director: DirectorConfig,
    /// Permanent stat upgrades.
    pub upgrades: UpgradeConfig,
    /// Orbital strike skill.
    pub skill: SkillConfig,
}

impl BalanceConfig {
    /// The RON source shipped with the crate.
    #[must_use]
    pub fn default_ron() -> &'static str {
        EMBEDDED_BALANCE
    }

    /// Parse a balance file from a RON string.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigParse`] when the source is malformed or the
    /// resulting tables are inconsistent.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        Self::parse(source, "<inline>")
    }

    /// Load a balance file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigLoad`] if the file cannot be read and
    /// [`SimError::ConfigParse`] if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| SimError::ConfigLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::parse(&source, &path.display().to_string())?;
        tracing::info!(path = %path.display(), "Loaded balance config");
        Ok(config)
    }

    fn parse(source: &str, label: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| SimError::ConfigParse {
            path: label.to_string(),
            message: e.to_string(),
        })?;
        config.validate().map_err(|message| SimError::ConfigParse {
            path: label.to_string(),
            message,
        })?;
        Ok(config)
    }

    /// Check cross-field consistency that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.economy.income.is_empty() {
            return Err("economy.income must contain at least one stage".into());
        }
        if !is_ascending(self.economy.income.iter().map(|s| s.after)) {
            return Err("economy.income stages must be sorted by `after`".into());
        }
        if self.director.unit_mix.is_empty() {
            return Err("director.unit_mix must contain at least one stage".into());
        }
        if !is_ascending(self.director.unit_mix.iter().map(|s| s.after)) {
            return Err("director.unit_mix stages must be sorted by `after`".into());
        }
        for stage in &self.director.unit_mix {
            if stage.total_weight() <= 0.0 {
                return Err(format!(
                    "director.unit_mix stage after {}s has no positive weights",
                    stage.after
                ));
            }
        }
        if !is_positive(self.agent.decision_interval) {
            return Err("agent.decision_interval must be positive".into());
        }
        if !is_positive(self.director.opponent.think_ramp) {
            return Err("director.opponent.think_ramp must be positive".into());
        }
        let widths = [
            ("battlefield.spawn_scatter", self.battlefield.spawn_scatter),
            ("battlefield.formation_spread", self.battlefield.formation_spread),
            ("base.shake_magnitude", self.base.shake_magnitude),
        ];
        for (name, width) in widths {
            check_width(name, width)?;
        }
        for kind in UnitKind::ALL {
            let stats = self.units.get(kind);
            if stats.fires_projectiles() && stats.ballistics.is_none() {
                return Err(format!("units.{} fires projectiles but has no ballistics", kind.id()));
            }
            if let AttackStyle::Volley { jitter, .. } = stats.attack {
                check_width(&format!("units.{}.jitter", kind.id()), jitter)?;
            }
        }
        Ok(())
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn check_width(name: &str, width: f32) -> std::result::Result<(), String> {
    if width.is_finite() && width >= 0.0 {
        Ok(())
    } else {
        Err(format!("{name} must be finite and non-negative, got {width}"))
    }
}

fn is_ascending(mut values: impl Iterator<Item = f32>) -> bool {
    let Some(mut prev) = values.next() else {
        return true;
    };
    for value in values {
        if value < prev {
            return false;
        }
        prev = value;
    }
    true
}

// ============================================================================
// Battlefield
// ============================================================================

/// Lane centre lines on the z axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneLayout {
    /// Top lane z.
    pub top: f32,
    /// Middle lane z.
    pub mid: f32,
    /// Bottom lane z.
    pub bot: f32,
}

/// Placement of bases, lanes and spawn scatter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BattlefieldConfig {
    /// Base x coordinate per team; units march towards the opposing one.
    pub base_x: PerTeam<f32>,
    /// Lane z coordinates.
    pub lanes: LaneLayout,
    /// Full width of the random z scatter applied at spawn.
    pub spawn_scatter: f32,
    /// Full width of the per-unit formation offset.
    pub formation_spread: f32,
}

impl BattlefieldConfig {
    /// Lane centre line.
    #[must_use]
    pub fn lane_z(&self, lane: Lane) -> f32 {
        match lane {
            Lane::Top => self.lanes.top,
            Lane::Mid => self.lanes.mid,
            Lane::Bot => self.lanes.bot,
        }
    }

    /// The x coordinate a team's units march towards.
    #[must_use]
    pub fn enemy_base_x(&self, team: Team) -> f32 {
        self.base_x[team.opponent()]
    }
}

impl Default for BattlefieldConfig {
    fn default() -> Self {
        Self {
            base_x: PerTeam::new(-350.0, 350.0),
            lanes: LaneLayout {
                top: -120.0,
                mid: 0.0,
                bot: 120.0,
            },
            spawn_scatter: 180.0,
            formation_spread: 180.0,
        }
    }
}

/// Base turret stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseConfig {
    /// Starting and maximum health.
    pub health: f32,
    /// Collision radius.
    pub radius: f32,
    /// Registry elevation of the base centre.
    pub elevation: f32,
    /// Defense radius; targets must be strictly inside it.
    pub defense_radius: f32,
    /// Fire period.
    pub cooldown: f32,
    /// Damage per turret shot.
    pub damage: f32,
    /// Turret projectile flight.
    pub ballistics: Ballistics,
    /// Nozzle distance ahead of the turret pivot.
    pub nozzle_forward: f32,
    /// Lateral offset of each of the two barrels.
    pub nozzle_lateral: f32,
    /// Nozzle elevation.
    pub nozzle_height: f32,
    /// Maximum shake displacement on each ground axis.
    pub shake_magnitude: f32,
    /// Shake duration after each hit.
    pub shake_duration: f32,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            health: 50_000.0,
            radius: 6.0,
            elevation: 2.0,
            defense_radius: 45.0,
            cooldown: 0.15,
            damage: 25.0,
            ballistics: Ballistics {
                speed: 4.0,
                arc: 0.0,
            },
            nozzle_forward: 4.0,
            nozzle_lateral: 0.5,
            nozzle_height: 5.0,
            shake_magnitude: 0.25,
            shake_duration: 0.05,
        }
    }
}

// ============================================================================
// Agents and projectiles
// ============================================================================

/// Combat agent behaviour shared by every unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentTuning {
    /// Perception radius for targets and separation.
    pub aggro_radius: f32,
    /// Interval between throttled decision ticks.
    pub decision_interval: f32,
    /// Cooldown below which an in-range unit plants and prepares to fire.
    pub ready_threshold: f32,
    /// Separation weight against same-team entries.
    pub ally_repulsion: f32,
    /// Separation weight against enemy entries.
    pub enemy_repulsion: f32,
    /// Separation weight against static obstacles.
    pub obstacle_repulsion: f32,
    /// Extra clearance kept from other entries.
    pub unit_margin: f32,
    /// Extra clearance kept from obstacles.
    pub obstacle_margin: f32,
    /// Separation magnitude as a multiple of unit speed.
    pub separation_strength: f32,
    /// Fraction of the separation impulse applied (and retained) per frame.
    pub separation_decay: f32,
    /// Squared magnitude below which the impulse is ignored.
    pub separation_epsilon: f32,
    /// Velocity blend rate per reference frame.
    pub steering_rate: f32,
    /// Turn blend rate per reference frame while locked on.
    pub turn_rate_locked: f32,
    /// Turn blend rate per reference frame while marching.
    pub turn_rate_marching: f32,
    /// Distance at which a marching unit counts as arrived.
    pub arrival_radius: f32,
    /// Muzzle height for tracers and projectiles.
    pub muzzle_height: f32,
    /// Muzzle height for flame jets.
    pub flame_muzzle_height: f32,
    /// Emitter height for aiming beams.
    pub beam_height: f32,
    /// Recoil displacement after a shot.
    pub recoil_kick: f32,
    /// Recoil recovery per time-unit.
    pub recoil_recovery: f32,
    /// Hit flash duration.
    pub hit_flash: f32,
    /// Health fraction below which damaged units smoke.
    pub smoke_threshold: f32,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            aggro_radius: 350.0,
            decision_interval: 0.1,
            ready_threshold: 0.2,
            ally_repulsion: 3.0,
            enemy_repulsion: 1.0,
            obstacle_repulsion: 5.0,
            unit_margin: 0.0,
            obstacle_margin: 1.0,
            separation_strength: 1.5,
            separation_decay: 0.2,
            separation_epsilon: 0.01,
            steering_rate: 0.1,
            turn_rate_locked: 0.3,
            turn_rate_marching: 0.1,
            arrival_radius: 20.0,
            muzzle_height: 3.0,
            flame_muzzle_height: 1.0,
            beam_height: 2.0,
            recoil_kick: 1.5,
            recoil_recovery: 5.0,
            hit_flash: 0.2,
            smoke_threshold: 0.4,
        }
    }
}

/// Projectile collision rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileTuning {
    /// Flight progress after which enemy units can be struck directly.
    pub unit_hit_after: f32,
    /// Padding added to a unit's radius for direct hits.
    pub unit_hit_padding: f32,
    /// Fraction of a rock's radius that blocks shots.
    pub rock_footprint: f32,
    /// Height below which ruins block shots.
    pub ruin_height: f32,
    /// Explosion size for shells without splash.
    pub explosion_size: f32,
    /// Decal size added on top of the splash radius.
    pub decal_size: f32,
    /// Per-frame chance of a trailing smoke puff.
    pub trail_chance: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            unit_hit_after: 0.5,
            unit_hit_padding: 1.0,
            rock_footprint: 0.8,
            ruin_height: 5.0,
            explosion_size: 2.0,
            decal_size: 3.0,
            trail_chance: 0.3,
        }
    }
}

/// Effect pool capacities and spawn parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Smoke pool capacity.
    pub smoke_capacity: usize,
    /// Debris pool capacity.
    pub debris_capacity: usize,
    /// Explosion pool capacity.
    pub explosion_capacity: usize,
    /// Flame pool capacity.
    pub flame_capacity: usize,
    /// Decal pool capacity.
    pub decal_capacity: usize,
    /// Tracer ring size.
    pub tracer_capacity: usize,
    /// Aiming beam ring size.
    pub beam_capacity: usize,
    /// Shortest damage smoke lifetime.
    pub smoke_life: f32,
    /// Random lifetime added on top of `smoke_life`.
    pub smoke_life_spread: f32,
    /// Upward speed of damage smoke.
    pub smoke_rise: f32,
    /// Scale growth of damage smoke per time-unit.
    pub smoke_growth: f32,
    /// Projectile trail puff size.
    pub trail_size: f32,
    /// Projectile trail puff lifetime.
    pub trail_life: f32,
    /// Scale growth of trail puffs per time-unit.
    pub trail_growth: f32,
    /// Fragments per debris burst.
    pub debris_fragments: usize,
    /// Largest launch speed of a fragment on each axis.
    pub debris_speed: f32,
    /// Fragment lifetime.
    pub debris_life: f32,
    /// Gravity applied to debris.
    pub gravity: f32,
    /// Floor height debris bounces on.
    pub debris_floor: f32,
    /// Velocity retained on bounce.
    pub restitution: f32,
    /// Explosion flash lifetime.
    pub explosion_life: f32,
    /// Scale growth of explosion flashes per time-unit.
    pub explosion_growth: f32,
    /// Tongues per flame burst.
    pub flame_tongues: usize,
    /// Farthest a tongue starts ahead of the nozzle.
    pub flame_reach: f32,
    /// Flame tongue lifetime.
    pub flame_life: f32,
    /// Flame tongue travel speed.
    pub flame_speed: f32,
    /// Upward speed of flame tongues.
    pub flame_rise: f32,
    /// Scale lost by flame tongues per time-unit.
    pub flame_shrink: f32,
    /// Decal lifetime.
    pub decal_life: f32,
    /// Trailing fraction of a decal's life spent fading out.
    pub decal_fade: f32,
    /// Tracer travel, in path fractions per time-unit.
    pub tracer_speed: f32,
    /// Tracer lifetime cap.
    pub tracer_life: f32,
    /// Aiming beam lifetime.
    pub beam_life: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            smoke_capacity: 1000,
            debris_capacity: 500,
            explosion_capacity: 100,
            flame_capacity: 1000,
            decal_capacity: 500,
            tracer_capacity: 500,
            beam_capacity: 100,
            smoke_life: 0.8,
            smoke_life_spread: 0.5,
            smoke_rise: 3.0,
            smoke_growth: 1.0,
            trail_size: 0.5,
            trail_life: 0.5,
            trail_growth: 1.0,
            debris_fragments: 6,
            debris_speed: 10.0,
            debris_life: 3.0,
            gravity: 30.0,
            debris_floor: 0.5,
            restitution: 0.5,
            explosion_life: 0.2,
            explosion_growth: 20.0,
            flame_tongues: 2,
            flame_reach: 2.0,
            flame_life: 0.4,
            flame_speed: 10.0,
            flame_rise: 2.0,
            flame_shrink: 1.0,
            decal_life: 15.0,
            decal_fade: 1.0 / 3.0,
            tracer_speed: 15.0,
            tracer_life: 0.2,
            beam_life: 0.1,
        }
    }
}

// ============================================================================
// Economy and director
// ============================================================================

/// One step of the income schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeStage {
    /// Clock time after which this rate applies.
    pub after: f32,
    /// Income per time-unit.
    pub rate: f32,
}

/// Money and income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Money each faction starts with.
    pub start_money: f32,
    /// Money never exceeds this.
    pub money_cap: f32,
    /// Income step function, sorted by `after`.
    pub income: Vec<IncomeStage>,
}

impl EconomyConfig {
    /// Income per time-unit at the given clock.
    ///
    /// The last stage whose breakpoint has been passed wins; before any
    /// breakpoint the first stage applies.
    #[must_use]
    pub fn income_rate(&self, clock: f32) -> f32 {
        self.income
            .iter()
            .rev()
            .find(|stage| clock > stage.after)
            .or_else(|| self.income.first())
            .map_or(0.0, |stage| stage.rate)
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        let stage = |after, rate| IncomeStage { after, rate };
        Self {
            start_money: 1000.0,
            money_cap: 999_999.0,
            income: vec![
                stage(0.0, 100.0),
                stage(60.0, 300.0),
                stage(120.0, 800.0),
                stage(180.0, 1500.0),
                stage(240.0, 3000.0),
                stage(300.0, 5000.0),
            ],
        }
    }
}

/// Relative purchase weight of one unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixWeight {
    /// Unit kind.
    pub kind: UnitKind,
    /// Relative weight.
    pub weight: f32,
}

/// Unit mix used once the clock passes `after`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixStage {
    /// Clock time after which this mix applies.
    pub after: f32,
    /// Weighted unit kinds.
    pub weights: Vec<MixWeight>,
}

impl MixStage {
    /// Sum of all positive weights.
    #[must_use]
    pub fn total_weight(&self) -> f32 {
        self.weights.iter().map(|w| w.weight.max(0.0)).sum()
    }

    /// Pick a kind from a uniform roll in `[0, 1)`.
    #[must_use]
    pub fn pick(&self, roll: f32) -> Option<UnitKind> {
        let mut remaining = roll.clamp(0.0, 1.0) * self.total_weight();
        let mut last = None;
        for entry in self.weights.iter().filter(|w| w.weight > 0.0) {
            if remaining < entry.weight {
                return Some(entry.kind);
            }
            remaining -= entry.weight;
            last = Some(entry.kind);
        }
        last
    }
}

/// Scripted opponent spending policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentPolicy {
    /// Think interval at the start of the match.
    pub think_interval: f32,
    /// Shortest think interval.
    pub think_floor: f32,
    /// Clock time over which the interval shrinks by one time-unit.
    pub think_ramp: f32,
    /// Spending continues while money exceeds this.
    pub spend_threshold: f32,
    /// Hard cap on purchase attempts per think-tick.
    pub max_purchases: u32,
}

impl OpponentPolicy {
    /// Think interval at the given clock.
    #[must_use]
    pub fn interval_at(&self, clock: f32) -> f32 {
        (self.think_interval - clock / self.think_ramp).max(self.think_floor)
    }
}

/// Automated ally policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllyPolicy {
    /// Per-frame chance of a purchase attempt.
    pub purchase_chance: f32,
    /// Money above which both upgrades are bought on a purchase attempt.
    pub upgrade_threshold: f32,
}

/// Director spending policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorConfig {
    /// Opponent policy.
    pub opponent: OpponentPolicy,
    /// Ally policy.
    pub ally: AllyPolicy,
    /// Unit mix schedule, sorted by `after`.
    pub unit_mix: Vec<MixStage>,
}

impl DirectorConfig {
    /// The unit mix active at the given clock.
    #[must_use]
    pub fn mix_at(&self, clock: f32) -> Option<&MixStage> {
        self.unit_mix
            .iter()
            .rev()
            .find(|stage| clock > stage.after)
            .or_else(|| self.unit_mix.first())
    }
}

impl Default for DirectorConfig {
    fn default() -> Self {
        let w = |kind, weight| MixWeight { kind, weight };
        Self {
            opponent: OpponentPolicy {
                think_interval: 1.0,
                think_floor: 0.1,
                think_ramp: 300.0,
                spend_threshold: 200.0,
                max_purchases: 10,
            },
            ally: AllyPolicy {
                purchase_chance: 0.2,
                upgrade_threshold: 5000.0,
            },
            unit_mix: vec![
                MixStage {
                    after: 0.0,
                    weights: vec![w(UnitKind::Ranger, 0.8), w(UnitKind::Tank, 0.2)],
                },
                MixStage {
                    after: 120.0,
                    weights: vec![
                        w(UnitKind::Ghost, 0.2),
                        w(UnitKind::Tank, 0.4),
                        w(UnitKind::Artillery, 0.4),
                    ],
                },
                MixStage {
                    after: 240.0,
                    weights: vec![w(UnitKind::Tank, 0.3), w(UnitKind::Artillery, 0.7)],
                },
            ],
        }
    }
}

/// Permanent upgrade pricing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeConfig {
    /// Cost per level.
    pub cost: f32,
    /// Multiplier per level.
    pub step: f32,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            cost: 800.0,
            step: 1.25,
        }
    }
}

/// Orbital strike skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillConfig {
    /// Cost per cast.
    pub cost: f32,
    /// Recharge time after a cast.
    pub cooldown: f32,
    /// Delay between cast and impact.
    pub delay: f32,
    /// Damage to each entry caught in the blast.
    pub damage: f32,
    /// Blast radius (inclusive).
    pub radius: f32,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            cost: 500.0,
            cooldown: 45.0,
            delay: 2.0,
            damage: 2500.0,
            radius: 35.0,
        }
    }
}
