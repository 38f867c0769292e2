//! Base turret: the stationary combat agent guarding each faction's base.

use glam::{Quat, Vec3};
use rand::Rng;

use crate::components::Shake;
use crate::data::{Ballistics, BaseConfig};
use crate::factions::Team;
use crate::math::{centered_roll, facing};
use crate::registry::{EntityId, Registry};

/// A projectile the turret wants fired this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurretShot {
    /// Barrel tip.
    pub muzzle: Vec3,
    /// Target position at fire time.
    pub aim: Vec3,
    /// Damage on impact.
    pub damage: f32,
    /// Flight parameters.
    pub ballistics: Ballistics,
}

/// Stationary turret state.
#[derive(Debug, Clone)]
pub struct BaseTurret {
    config: BaseConfig,
    /// Time until the next shot.
    pub cooldown: f32,
    /// Nearest intruder as of the last step.
    pub target: Option<EntityId>,
    /// Turret head facing.
    pub aim: Quat,
    /// Cosmetic hit shake.
    pub shake: Shake,
}

impl BaseTurret {
    /// Create an idle turret.
    #[must_use]
    pub fn new(config: BaseConfig) -> Self {
        Self {
            config,
            cooldown: 0.0,
            target: None,
            aim: Quat::IDENTITY,
            shake: Shake::default(),
        }
    }

    /// Start a small random shake.
    pub fn on_hit<R: Rng>(&mut self, rng: &mut R) {
        let width = self.config.shake_magnitude * 2.0;
        let offset = Vec3::new(centered_roll(rng, width), 0.0, centered_roll(rng, width));
        self.shake.kick(offset, self.config.shake_duration);
    }

    /// Advance timers, track the nearest intruder and, when ready, fire at it.
    pub fn step<R: Rng>(
        &mut self,
        delta: f32,
        position: Vec3,
        intruder: Option<(EntityId, Vec3)>,
        rng: &mut R,
    ) -> Option<TurretShot> {
        self.shake.advance(delta);
        self.cooldown = (self.cooldown - delta).max(0.0);

        self.target = intruder.map(|(id, _)| id);
        let (_, aim) = intruder?;
        if let Some(look) = facing(position, aim) {
            self.aim = look;
        }
        if self.cooldown > 0.0 {
            return None;
        }
        self.cooldown = self.config.cooldown;

        let lateral = if rng.gen_bool(0.5) {
            self.config.nozzle_lateral
        } else {
            -self.config.nozzle_lateral
        };
        let mut muzzle = position + self.aim * Vec3::new(lateral, 0.0, self.config.nozzle_forward);
        muzzle.y = self.config.nozzle_height;

        Some(TurretShot {
            muzzle,
            aim,
            damage: self.config.damage,
            ballistics: self.config.ballistics,
        })
    }
}

/// Nearest enemy strictly inside the defense radius of a base.
#[must_use]
pub fn nearest_intruder(
    registry: &Registry,
    position: Vec3,
    team: Team,
    defense_radius: f32,
) -> Option<(EntityId, Vec3)> {
    let range_sq = defense_radius * defense_radius;
    registry
        .iter()
        .filter(|(_, entry)| entry.team != team)
        .map(|(id, entry)| (id, entry.position, entry.position.distance_squared(position)))
        .filter(|(_, _, dist_sq)| *dist_sq < range_sq)
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(id, pos, _)| (id, pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use slotmap::SlotMap;

    #[test]
    fn test_turret_fires_on_cooldown() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut ids: SlotMap<EntityId, ()> = SlotMap::with_key();
        let intruder = ids.insert(());
        let config = BaseConfig::default();
        let mut turret = BaseTurret::new(config);
        let base = Vec3::new(350.0, 2.0, 0.0);
        let target = Some((intruder, Vec3::new(320.0, 0.0, 0.0)));

        let shot = turret.step(0.016, base, target, &mut rng).expect("ready turret fires");
        assert_eq!(shot.damage, 25.0);
        assert_eq!(shot.muzzle.y, config.nozzle_height);
        // Facing -x, so the barrel tip is ahead of the base towards the target.
        assert!(shot.muzzle.x < base.x);

        assert!(turret.step(0.05, base, target, &mut rng).is_none());
        assert!(turret.step(0.11, base, target, &mut rng).is_some());
    }

    #[test]
    fn test_turret_tracks_intruder_while_reloading() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut ids: SlotMap<EntityId, ()> = SlotMap::with_key();
        let first = ids.insert(());
        let second = ids.insert(());
        let mut turret = BaseTurret::new(BaseConfig::default());
        let base = Vec3::new(350.0, 2.0, 0.0);

        let west = Some((first, Vec3::new(320.0, 0.0, 0.0)));
        assert!(turret.step(0.016, base, west, &mut rng).is_some());

        let south = Some((second, Vec3::new(350.0, 0.0, 30.0)));
        assert!(turret.step(0.016, base, south, &mut rng).is_none());
        assert_eq!(turret.target, Some(second));
        let forward = turret.aim * Vec3::Z;
        assert!(forward.distance(Vec3::Z) < 1e-4, "aim {forward:?}");

        assert!(turret.step(0.016, base, None, &mut rng).is_none());
        assert_eq!(turret.target, None);
    }

    #[test]
    fn test_idle_turret_holds_fire() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut turret = BaseTurret::new(BaseConfig::default());
        assert!(turret.step(0.1, Vec3::ZERO, None, &mut rng).is_none());
    }

    #[test]
    fn test_hit_shake_is_bounded_and_reverts() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let config = BaseConfig::default();
        let mut turret = BaseTurret::new(config);
        for _ in 0..20 {
            turret.on_hit(&mut rng);
            assert!(turret.shake.offset.x.abs() <= config.shake_magnitude);
            assert!(turret.shake.offset.z.abs() <= config.shake_magnitude);
        }
        turret.step(config.shake_duration + 0.01, Vec3::ZERO, None, &mut rng);
        assert_eq!(turret.shake.offset, Vec3::ZERO);
    }
}
