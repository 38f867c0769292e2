//! Ballistic projectiles and their collision resolution.
//!
//! A projectile flies along a fixed arc from its muzzle to the point its
//! target occupied at fire time; it is never re-aimed. Each frame resolves,
//! in order, static obstacles, enemy entries (second half of the flight
//! only) and finally the timeout at `t >= 1`.

use glam::Vec3;
use rand::Rng;

use crate::data::{Ballistics, ProjectileTuning};
use crate::effects::EffectPools;
use crate::factions::Team;
use crate::math::{arc_point, outside_box};
use crate::obstacles::Obstacle;
use crate::registry::{EntityId, Registry};

/// A shell in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    /// Muzzle position.
    pub start: Vec3,
    /// Aim point captured at fire time.
    pub target: Vec3,
    /// Flight progress; lands at 1.
    pub progress: f32,
    /// Progress gained per time-unit.
    pub speed: f32,
    /// Arc height at mid-flight.
    pub arc: f32,
    /// Damage on impact.
    pub damage: f32,
    /// Splash radius; 0 for single-target shells.
    pub splash: f32,
    /// Firing faction.
    pub team: Team,
    /// Current position.
    pub position: Vec3,
}

impl Projectile {
    /// Create a projectile at its muzzle.
    #[must_use]
    pub fn new(
        start: Vec3,
        target: Vec3,
        ballistics: Ballistics,
        damage: f32,
        splash: f32,
        team: Team,
    ) -> Self {
        Self {
            start,
            target,
            progress: 0.0,
            speed: ballistics.speed,
            arc: ballistics.arc,
            damage,
            splash,
            team,
            position: start,
        }
    }

    /// Position at a given progress along this projectile's arc.
    #[must_use]
    pub fn position_at(&self, progress: f32) -> Vec3 {
        arc_point(self.start, self.target, self.arc, progress)
    }

    fn step(&mut self, delta: f32) {
        self.progress += delta * self.speed;
        self.position = self.position_at(self.progress);
    }
}

/// How a projectile's flight ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactKind {
    /// Blocked by terrain.
    Obstacle,
    /// Struck an enemy entry directly.
    Direct(EntityId),
    /// Reached its aim point.
    Landed,
}

/// A terminal projectile event, resolved by the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    /// Where the flight ended.
    pub position: Vec3,
    /// How it ended.
    pub kind: ImpactKind,
    /// Projectile damage.
    pub damage: f32,
    /// Projectile splash radius.
    pub splash: f32,
    /// Firing faction.
    pub team: Team,
}

impl Impact {
    /// Whether this impact triggers area damage.
    ///
    /// Only shells that land at their aim point explode for area damage;
    /// shells stopped early by terrain or a direct hit do not.
    #[must_use]
    pub fn explodes(&self) -> bool {
        self.splash > 0.0 && self.kind == ImpactKind::Landed
    }
}

/// All projectiles in flight.
#[derive(Debug, Clone, Default)]
pub struct ProjectileSim {
    projectiles: Vec<Projectile>,
}

impl ProjectileSim {
    /// Create an empty simulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch a projectile.
    pub fn fire(&mut self, projectile: Projectile) {
        self.projectiles.push(projectile);
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn in_flight(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    /// Check if nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Drop every projectile.
    pub fn clear(&mut self) {
        self.projectiles.clear();
    }

    /// Advance every projectile and return the ones that terminated.
    ///
    /// Terminal projectiles leave an explosion and a scorch decal; survivors
    /// may leave a trail puff.
    pub fn advance<R: Rng>(
        &mut self,
        delta: f32,
        registry: &Registry,
        obstacles: &[Obstacle],
        tuning: &ProjectileTuning,
        effects: &mut EffectPools,
        rng: &mut R,
    ) -> Vec<Impact> {
        let mut impacts = Vec::new();
        self.projectiles.retain_mut(|projectile| {
            projectile.step(delta);
            let Some(kind) = resolve(projectile, registry, obstacles, tuning) else {
                if rng.gen::<f32>() < tuning.trail_chance {
                    effects.spawn_trail(projectile.position, rng);
                }
                return true;
            };

            let size = if projectile.splash > 0.0 {
                projectile.splash
            } else {
                tuning.explosion_size
            };
            effects.spawn_explosion(projectile.position, projectile.team.color(), size);
            effects.spawn_decal(
                projectile.position,
                tuning.decal_size + projectile.splash,
                rng,
            );
            tracing::trace!(?kind, team = ?projectile.team, "Projectile terminated");
            impacts.push(Impact {
                position: projectile.position,
                kind,
                damage: projectile.damage,
                splash: projectile.splash,
                team: projectile.team,
            });
            false
        });
        impacts
    }
}

/// Collision checks in priority order; `None` means still flying.
fn resolve(
    projectile: &Projectile,
    registry: &Registry,
    obstacles: &[Obstacle],
    tuning: &ProjectileTuning,
) -> Option<ImpactKind> {
    let position = projectile.position;

    let blocked = obstacles
        .iter()
        .filter(|obstacle| !outside_box(position, obstacle.center(), obstacle.radius))
        .any(|obstacle| obstacle.blocks(position, tuning));
    if blocked {
        return Some(ImpactKind::Obstacle);
    }

    if projectile.progress > tuning.unit_hit_after {
        let struck = registry.iter().find(|(_, entry)| {
            if entry.team == projectile.team {
                return false;
            }
            let reach = entry.radius + tuning.unit_hit_padding;
            !outside_box(position, entry.position, reach)
                && position.distance_squared(entry.position) < reach * reach
        });
        if let Some((id, _)) = struck {
            return Some(ImpactKind::Direct(id));
        }
    }

    if projectile.progress >= 1.0 {
        return Some(ImpactKind::Landed);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Health;
    use crate::data::{BaseConfig, EffectConfig};
    use crate::obstacles::ObstacleShape;
    use crate::registry::{Body, EntityKind, RegistryEntry};
    use crate::turret::BaseTurret;
    use glam::Quat;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const LOBBED: Ballistics = Ballistics {
        speed: 1.0,
        arc: 10.0,
    };

    fn setup() -> (Registry, EffectPools, ChaCha8Rng) {
        (
            Registry::new(),
            EffectPools::new(EffectConfig::default()),
            ChaCha8Rng::seed_from_u64(9),
        )
    }

    #[test]
    fn test_shell_lands_at_aim_point() {
        let (registry, mut effects, mut rng) = setup();
        let mut sim = ProjectileSim::new();
        let target = Vec3::new(40.0, 0.0, 0.0);
        sim.fire(Projectile::new(Vec3::ZERO, target, LOBBED, 50.0, 6.0, Team::Red));

        let tuning = ProjectileTuning::default();
        let mut impacts = Vec::new();
        for _ in 0..20 {
            impacts = sim.advance(0.1, &registry, &[], &tuning, &mut effects, &mut rng);
            if !impacts.is_empty() {
                break;
            }
        }
        assert_eq!(impacts.len(), 1);
        let impact = impacts[0];
        assert_eq!(impact.kind, ImpactKind::Landed);
        assert!(impact.explodes());
        assert!((impact.position - target).length() < 1e-3);
        assert!(sim.is_empty());
        assert_eq!(effects.explosions.live_count(), 1);
        assert_eq!(effects.decals.live_count(), 1);
    }

    #[test]
    fn test_obstacle_stops_shell_without_area_damage() {
        let (registry, mut effects, mut rng) = setup();
        let mut sim = ProjectileSim::new();
        let direct = Ballistics {
            speed: 1.0,
            arc: 0.0,
        };
        sim.fire(Projectile::new(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(100.0, 1.0, 0.0),
            direct,
            50.0,
            6.0,
            Team::Blue,
        ));
        let wall = [Obstacle::new(20.0, 0.0, 8.0, ObstacleShape::Ruin)];
        let tuning = ProjectileTuning::default();
        // Progress 0.15 puts the shell at x = 15, inside the ruin footprint.
        let impacts = sim.advance(0.15, &registry, &wall, &tuning, &mut effects, &mut rng);
        assert_eq!(impacts.len(), 1);
        assert_eq!(impacts[0].kind, ImpactKind::Obstacle);
        assert!(!impacts[0].explodes());
    }

    fn blocker(team: Team, x: f32) -> RegistryEntry {
        RegistryEntry {
            team,
            kind: EntityKind::Base,
            position: Vec3::new(x, 0.0, 0.0),
            orientation: Quat::IDENTITY,
            radius: 1.5,
            health: Health::new(100.0),
            body: Body::Base(BaseTurret::new(BaseConfig::default())),
        }
    }

    #[test]
    fn test_enemies_are_ignored_during_first_half_of_flight() {
        let (mut registry, mut effects, mut rng) = setup();
        let early = registry.register(blocker(Team::Red, 20.0));
        let late = registry.register(blocker(Team::Red, 70.0));
        let flat = Ballistics {
            speed: 1.0,
            arc: 0.0,
        };
        let mut sim = ProjectileSim::new();
        sim.fire(Projectile::new(
            Vec3::ZERO,
            Vec3::new(100.0, 0.0, 0.0),
            flat,
            50.0,
            0.0,
            Team::Blue,
        ));
        let tuning = ProjectileTuning::default();

        // Dead centre on the first enemy, but only a fifth of the way in.
        let impacts = sim.advance(0.2, &registry, &[], &tuning, &mut effects, &mut rng);
        assert!(impacts.is_empty());
        assert!((sim.in_flight()[0].position.x - 20.0).abs() < 1e-4);

        let impacts = sim.advance(0.3, &registry, &[], &tuning, &mut effects, &mut rng);
        assert!(impacts.is_empty());

        let impacts = sim.advance(0.2, &registry, &[], &tuning, &mut effects, &mut rng);
        assert_eq!(impacts.len(), 1);
        assert_eq!(impacts[0].kind, ImpactKind::Direct(late));
        assert_ne!(impacts[0].kind, ImpactKind::Direct(early));
        assert!(sim.is_empty());
    }

    #[test]
    fn test_position_follows_arc_formula() {
        let p = Projectile::new(
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            LOBBED,
            1.0,
            0.0,
            Team::Red,
        );
        let mid = p.position_at(0.5);
        assert!((mid - Vec3::new(5.0, 1.5 + 10.0, 0.0)).length() < 1e-4);
    }
}
