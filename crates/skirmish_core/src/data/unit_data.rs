//! Unit data structures for data-driven unit definitions.

use serde::{Deserialize, Serialize};

use crate::economy::UpgradeMultipliers;

/// The closed set of purchasable unit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Cheap rifle infantry with a hit-scan attack.
    Ranger,
    /// Short-range flamethrower dealing continuous damage.
    Flamebat,
    /// Long-range sniper that must channel before each shot.
    Ghost,
    /// Siege tank lobbing a single splash shell.
    Tank,
    /// Heavy walker firing staggered splash volleys.
    Artillery,
}

impl UnitKind {
    /// All unit kinds, cheapest first.
    pub const ALL: [Self; 5] = [
        Self::Ranger,
        Self::Flamebat,
        Self::Ghost,
        Self::Tank,
        Self::Artillery,
    ];

    /// Stable lowercase identifier, used in logs and result files.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Ranger => "ranger",
            Self::Flamebat => "flamebat",
            Self::Ghost => "ghost",
            Self::Tank => "tank",
            Self::Artillery => "artillery",
        }
    }
}

/// How a unit delivers its damage once it is planted and ready.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackStyle {
    /// Instant tracer; damage lands on the target immediately.
    HitScan,
    /// Short-interval direct damage paired with a flame visual.
    Continuous,
    /// Sustained lock-on before a single heavy hit.
    Channeled {
        /// Lock-on time required before the shot fires.
        aim_time: f32,
    },
    /// One ballistic splash projectile per cycle.
    Lobbed,
    /// Several staggered splash projectiles sharing the listed damage.
    Volley {
        /// Number of sub-shots per volley.
        shots: u32,
        /// Delay between consecutive sub-shots.
        stagger: f32,
        /// Total horizontal aim scatter (each shot lands within +/- half).
        jitter: f32,
    },
}

/// Flight parameters for projectile-firing shooters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ballistics {
    /// Progress gained per time-unit (flight time is `1 / speed`).
    pub speed: f32,
    /// Peak height added at mid-flight; 0 for direct fire.
    pub arc: f32,
}

/// Data-driven stats for one unit kind.
///
/// # Example RON
///
/// ```ron
/// (
///     name: "Siege Tank",
///     cost: 250.0,
///     health: 1000.0,
///     speed: 7.0,
///     range: 65.0,
///     damage: 100.0,
///     cooldown: 2.5,
///     radius: 3.5,
///     splash: 18.0,
///     attack: Lobbed,
///     ballistics: Some((speed: 3.0, arc: 5.0)),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Display name.
    pub name: String,
    /// Purchase price.
    pub cost: f32,
    /// Maximum health before upgrades.
    pub health: f32,
    /// Top speed in world units per time-unit.
    pub speed: f32,
    /// Attack range.
    pub range: f32,
    /// Damage per attack (per volley for [`AttackStyle::Volley`]).
    pub damage: f32,
    /// Fire period.
    pub cooldown: f32,
    /// Collision radius.
    pub radius: f32,
    /// Splash radius; 0 for single-target attacks.
    #[serde(default)]
    pub splash: f32,
    /// Attack delivery.
    pub attack: AttackStyle,
    /// Projectile flight, for styles that fire projectiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ballistics: Option<Ballistics>,
}

impl UnitStats {
    /// Apply a faction's upgrade multipliers. Called once at spawn time.
    #[must_use]
    pub fn upgraded(&self, multipliers: UpgradeMultipliers) -> Self {
        Self {
            health: self.health * multipliers.health_multiplier,
            damage: self.damage * multipliers.attack_multiplier,
            ..self.clone()
        }
    }

    /// Check if this unit fires projectiles rather than applying damage directly.
    #[must_use]
    pub fn fires_projectiles(&self) -> bool {
        matches!(self.attack, AttackStyle::Lobbed | AttackStyle::Volley { .. })
    }
}

/// The full roster of unit stats, one entry per [`UnitKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRoster {
    /// Ranger stats.
    pub ranger: UnitStats,
    /// Flamebat stats.
    pub flamebat: UnitStats,
    /// Ghost stats.
    pub ghost: UnitStats,
    /// Tank stats.
    pub tank: UnitStats,
    /// Artillery stats.
    pub artillery: UnitStats,
}

impl UnitRoster {
    /// Look up the stats for a kind.
    #[must_use]
    pub fn get(&self, kind: UnitKind) -> &UnitStats {
        match kind {
            UnitKind::Ranger => &self.ranger,
            UnitKind::Flamebat => &self.flamebat,
            UnitKind::Ghost => &self.ghost,
            UnitKind::Tank => &self.tank,
            UnitKind::Artillery => &self.artillery,
        }
    }

    /// Mutable lookup, used by tests and tuning tools.
    pub fn get_mut(&mut self, kind: UnitKind) -> &mut UnitStats {
        match kind {
            UnitKind::Ranger => &mut self.ranger,
            UnitKind::Flamebat => &mut self.flamebat,
            UnitKind::Ghost => &mut self.ghost,
            UnitKind::Tank => &mut self.tank,
            UnitKind::Artillery => &mut self.artillery,
        }
    }
}

impl Default for UnitRoster {
    fn default() -> Self {
        Self {
            ranger: UnitStats {
                name: "Marine".to_string(),
                cost: 50.0,
                health: 120.0,
                speed: 13.0,
                range: 35.0,
                damage: 15.0,
                cooldown: 0.2,
                radius: 1.5,
                splash: 0.0,
                attack: AttackStyle::HitScan,
                ballistics: None,
            },
            flamebat: UnitStats {
                name: "Flamebat".to_string(),
                cost: 100.0,
                health: 300.0,
                speed: 11.0,
                range: 18.0,
                damage: 10.0,
                cooldown: 0.05,
                radius: 1.8,
                splash: 0.0,
                attack: AttackStyle::Continuous,
                ballistics: None,
            },
            ghost: UnitStats {
                name: "Ghost".to_string(),
                cost: 150.0,
                health: 100.0,
                speed: 12.0,
                range: 75.0,
                damage: 350.0,
                cooldown: 4.0,
                radius: 1.4,
                splash: 0.0,
                attack: AttackStyle::Channeled { aim_time: 1.5 },
                ballistics: None,
            },
            tank: UnitStats {
                name: "Siege Tank".to_string(),
                cost: 250.0,
                health: 1000.0,
                speed: 7.0,
                range: 65.0,
                damage: 100.0,
                cooldown: 2.5,
                radius: 3.5,
                splash: 18.0,
                attack: AttackStyle::Lobbed,
                ballistics: Some(Ballistics {
                    speed: 3.0,
                    arc: 5.0,
                }),
            },
            artillery: UnitStats {
                name: "Thor".to_string(),
                cost: 600.0,
                health: 2500.0,
                speed: 5.0,
                range: 55.0,
                damage: 25.0,
                cooldown: 0.1,
                radius: 4.5,
                splash: 6.0,
                attack: AttackStyle::Volley {
                    shots: 4,
                    stagger: 0.1,
                    jitter: 5.0,
                },
                ballistics: Some(Ballistics {
                    speed: 1.5,
                    arc: 15.0,
                }),
            },
        }
    }
}
