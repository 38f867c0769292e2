//! Economy: the match clock, faction money, upgrades and skill cooldowns.
//!
//! Income is a step function of elapsed time applied to both factions
//! equally. Money is clamped to a cap; spending is all-or-nothing.

use serde::{Deserialize, Serialize};

use crate::data::EconomyConfig;
use crate::error::{Result, SimError};
use crate::factions::{PerTeam, Team};

/// A faction's money.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Treasury {
    money: f32,
    cap: f32,
}

impl Treasury {
    /// Create a treasury holding `money` (clamped to `cap`).
    #[must_use]
    pub fn new(money: f32, cap: f32) -> Self {
        Self {
            money: money.clamp(0.0, cap),
            cap,
        }
    }

    /// Current balance.
    #[must_use]
    pub const fn money(&self) -> f32 {
        self.money
    }

    /// Add money, clamped to the cap. Returns the amount actually added.
    pub fn deposit(&mut self, amount: f32) -> f32 {
        let before = self.money;
        self.money = (self.money + amount.max(0.0)).min(self.cap);
        self.money - before
    }

    /// Check if a cost can be paid.
    #[must_use]
    pub fn can_afford(&self, cost: f32) -> bool {
        self.money >= cost
    }

    /// Pay `cost` if affordable. Returns whether the payment happened.
    pub fn spend(&mut self, cost: f32) -> bool {
        if self.can_afford(cost) {
            self.money -= cost;
            true
        } else {
            false
        }
    }
}

/// Which stat an upgrade improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Damage of newly spawned units.
    Attack,
    /// Health of newly spawned units.
    Health,
}

/// Purchased upgrade levels for one faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Upgrades {
    /// Attack upgrade level.
    pub attack_level: u32,
    /// Health upgrade level.
    pub health_level: u32,
}

impl Upgrades {
    /// Level of one upgrade track.
    #[must_use]
    pub const fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Attack => self.attack_level,
            UpgradeKind::Health => self.health_level,
        }
    }

    /// Raise one track by a level, returning the new level.
    pub fn raise(&mut self, kind: UpgradeKind) -> u32 {
        let level = match kind {
            UpgradeKind::Attack => &mut self.attack_level,
            UpgradeKind::Health => &mut self.health_level,
        };
        *level += 1;
        *level
    }

    /// Multipliers for a per-level `step` (`step ^ level`).
    #[must_use]
    pub fn multipliers(&self, step: f32) -> UpgradeMultipliers {
        let scale = |level: u32| step.powi(i32::try_from(level).unwrap_or(i32::MAX));
        UpgradeMultipliers {
            attack_multiplier: scale(self.attack_level),
            health_multiplier: scale(self.health_level),
        }
    }
}

/// Stat multipliers applied to base unit stats at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeMultipliers {
    /// Damage multiplier.
    pub attack_multiplier: f32,
    /// Health multiplier.
    pub health_multiplier: f32,
}

impl Default for UpgradeMultipliers {
    fn default() -> Self {
        Self {
            attack_multiplier: 1.0,
            health_multiplier: 1.0,
        }
    }
}

/// Match clock plus per-faction economic state.
#[derive(Debug, Clone)]
pub struct Economy {
    config: EconomyConfig,
    clock: f32,
    treasuries: PerTeam<Treasury>,
    upgrades: PerTeam<Upgrades>,
    skill_cooldown: PerTeam<f32>,
}

impl Economy {
    /// Start a match: clock at zero, both factions at starting money.
    #[must_use]
    pub fn new(config: EconomyConfig) -> Self {
        let treasury = Treasury::new(config.start_money, config.money_cap);
        Self {
            clock: 0.0,
            treasuries: PerTeam::splat(treasury),
            upgrades: PerTeam::default(),
            skill_cooldown: PerTeam::default(),
            config,
        }
    }

    /// Elapsed match time.
    #[must_use]
    pub const fn clock(&self) -> f32 {
        self.clock
    }

    /// A faction's balance.
    #[must_use]
    pub fn money(&self, team: Team) -> f32 {
        self.treasuries[team].money()
    }

    /// Current income per time-unit.
    #[must_use]
    pub fn income_rate(&self) -> f32 {
        self.config.income_rate(self.clock)
    }

    /// Advance the clock, pay income to both factions and tick skill
    /// cooldowns. Returns the income rate used.
    pub fn advance(&mut self, delta: f32) -> f32 {
        self.clock += delta;
        let rate = self.income_rate();
        for team in Team::ALL {
            self.treasuries[team].deposit(rate * delta);
            let cooldown = &mut self.skill_cooldown[team];
            *cooldown = (*cooldown - delta).max(0.0);
        }
        rate
    }

    /// Add money to a faction outside the income schedule (capped).
    pub fn grant(&mut self, team: Team, amount: f32) -> f32 {
        self.treasuries[team].deposit(amount)
    }

    /// Check if a faction can pay `cost`.
    #[must_use]
    pub fn can_afford(&self, team: Team, cost: f32) -> bool {
        self.treasuries[team].can_afford(cost)
    }

    /// Pay `cost` from a faction's treasury.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InsufficientFunds`] and leaves money untouched if
    /// the faction cannot pay.
    pub fn try_spend(&mut self, team: Team, cost: f32) -> Result<()> {
        let treasury = &mut self.treasuries[team];
        if treasury.spend(cost) {
            Ok(())
        } else {
            Err(SimError::InsufficientFunds {
                required: cost,
                available: treasury.money(),
            })
        }
    }

    /// A faction's upgrade levels.
    #[must_use]
    pub fn upgrades(&self, team: Team) -> Upgrades {
        self.upgrades[team]
    }

    /// Raise a faction's upgrade level (already paid for).
    pub fn raise_upgrade(&mut self, team: Team, kind: UpgradeKind) -> u32 {
        self.upgrades[team].raise(kind)
    }

    /// Time until a faction's skill is ready again.
    #[must_use]
    pub fn skill_cooldown(&self, team: Team) -> f32 {
        self.skill_cooldown[team]
    }

    /// Start a faction's skill cooldown.
    pub fn start_skill_cooldown(&mut self, team: Team, duration: f32) {
        self.skill_cooldown[team] = duration;
    }
}
