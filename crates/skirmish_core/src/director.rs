//! Scripted spending for the opponent and the optional automated ally.
//!
//! The director decides *what* to buy and pays for it; the simulation
//! realises each returned [`Purchase`] (spawn or upgrade) in the same frame.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::{DirectorConfig, UnitKind, UnitRoster, UpgradeConfig};
use crate::economy::{Economy, UpgradeKind};
use crate::factions::Team;

/// Faction driven by the scripted opponent.
pub const OPPONENT: Team = Team::Red;
/// Faction driven by the automated ally when enabled.
pub const ALLY: Team = Team::Blue;

/// A paid-for purchase the simulation must realise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purchase {
    /// Spawn a unit on a random flank lane.
    Unit {
        /// Buying faction.
        team: Team,
        /// Unit kind.
        kind: UnitKind,
    },
    /// Raise an upgrade level.
    Upgrade {
        /// Buying faction.
        team: Team,
        /// Upgrade track.
        kind: UpgradeKind,
    },
}

/// Which scripted agents run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorToggles {
    /// Run the scripted opponent.
    pub opponent: bool,
    /// Run the automated ally.
    pub ally: bool,
}

/// Spending AI state.
#[derive(Debug, Clone, Default)]
pub struct Director {
    think_timer: f32,
}

impl Director {
    /// Create a director with its think timer at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame of spending. `economy` must already be advanced for
    /// this frame.
    pub fn update<R: Rng>(
        &mut self,
        delta: f32,
        toggles: DirectorToggles,
        economy: &mut Economy,
        policy: &DirectorConfig,
        roster: &UnitRoster,
        upgrades: &UpgradeConfig,
        rng: &mut R,
    ) -> Vec<Purchase> {
        let mut purchases = Vec::new();
        if toggles.opponent {
            self.opponent_think(delta, economy, policy, roster, rng, &mut purchases);
        }
        if toggles.ally {
            ally_sample(economy, policy, roster, upgrades, rng, &mut purchases);
        }
        purchases
    }

    fn opponent_think<R: Rng>(
        &mut self,
        delta: f32,
        economy: &mut Economy,
        policy: &DirectorConfig,
        roster: &UnitRoster,
        rng: &mut R,
        purchases: &mut Vec<Purchase>,
    ) {
        let clock = economy.clock();
        self.think_timer += delta;
        if self.think_timer <= policy.opponent.interval_at(clock) {
            return;
        }
        self.think_timer = 0.0;

        let before = purchases.len();
        let mut attempts = 0;
        while economy.money(OPPONENT) > policy.opponent.spend_threshold
            && attempts < policy.opponent.max_purchases
        {
            attempts += 1;
            let Some(kind) = pick_unit(policy, clock, rng) else {
                break;
            };
            if economy
                .try_spend(OPPONENT, roster.get(kind).cost)
                .is_ok()
            {
                purchases.push(Purchase::Unit {
                    team: OPPONENT,
                    kind,
                });
            }
        }
        tracing::debug!(
            clock,
            bought = purchases.len() - before,
            money = economy.money(OPPONENT),
            "Opponent think-tick"
        );
    }
}

fn ally_sample<R: Rng>(
    economy: &mut Economy,
    policy: &DirectorConfig,
    roster: &UnitRoster,
    upgrades: &UpgradeConfig,
    rng: &mut R,
    purchases: &mut Vec<Purchase>,
) {
    if rng.gen::<f32>() >= policy.ally.purchase_chance {
        return;
    }
    if let Some(kind) = pick_unit(policy, economy.clock(), rng) {
        if economy.try_spend(ALLY, roster.get(kind).cost).is_ok() {
            purchases.push(Purchase::Unit { team: ALLY, kind });
        }
    }
    if economy.money(ALLY) > policy.ally.upgrade_threshold {
        for kind in [UpgradeKind::Attack, UpgradeKind::Health] {
            if economy.try_spend(ALLY, upgrades.cost).is_ok() {
                purchases.push(Purchase::Upgrade { team: ALLY, kind });
            }
        }
    }
}

fn pick_unit<R: Rng>(policy: &DirectorConfig, clock: f32, rng: &mut R) -> Option<UnitKind> {
    policy.mix_at(clock)?.pick(rng.gen::<f32>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EconomyConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const OPPONENT_ONLY: DirectorToggles = DirectorToggles {
        opponent: true,
        ally: false,
    };

    #[test]
    fn test_opponent_waits_for_think_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut economy = Economy::new(EconomyConfig::default());
        let mut director = Director::new();
        let policy = DirectorConfig::default();
        let roster = UnitRoster::default();
        let upgrades = UpgradeConfig::default();

        let mut tick = |economy: &mut Economy, delta: f32| {
            economy.advance(delta);
            director.update(
                delta,
                OPPONENT_ONLY,
                economy,
                &policy,
                &roster,
                &upgrades,
                &mut rng,
            )
        };

        assert!(tick(&mut economy, 0.5).is_empty());
        let bought = tick(&mut economy, 0.6);
        assert!(!bought.is_empty());
        assert!(bought
            .iter()
            .all(|p| matches!(p, Purchase::Unit { team: Team::Red, .. })));
    }

    #[test]
    fn test_opponent_purchases_are_capped_per_tick() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let config = EconomyConfig {
            start_money: 900_000.0,
            ..EconomyConfig::default()
        };
        let mut economy = Economy::new(config);
        let mut director = Director::new();
        let policy = DirectorConfig::default();

        economy.advance(1.5);
        let bought = director.update(
            1.5,
            OPPONENT_ONLY,
            &mut economy,
            &policy,
            &UnitRoster::default(),
            &UpgradeConfig::default(),
            &mut rng,
        );
        assert_eq!(bought.len(), policy.opponent.max_purchases as usize);
    }

    #[test]
    fn test_rich_ally_buys_upgrades() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let config = EconomyConfig {
            start_money: 50_000.0,
            ..EconomyConfig::default()
        };
        let mut economy = Economy::new(config);
        let mut director = Director::new();
        let toggles = DirectorToggles {
            opponent: false,
            ally: true,
        };
        let mut upgrades_bought = 0;
        for _ in 0..200 {
            economy.advance(1.0 / 60.0);
            let bought = director.update(
                1.0 / 60.0,
                toggles,
                &mut economy,
                &DirectorConfig::default(),
                &UnitRoster::default(),
                &UpgradeConfig::default(),
                &mut rng,
            );
            upgrades_bought += bought
                .iter()
                .filter(|p| matches!(p, Purchase::Upgrade { team: Team::Blue, .. }))
                .count();
        }
        assert!(upgrades_bought >= 2);
        assert_eq!(economy.upgrades(Team::Red), Default::default());
    }
}
