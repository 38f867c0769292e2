//! Bounded particle pools for transient visual effects.
//!
//! Every effect kind lives in a fixed-capacity pool. Spawning into a full pool
//! recycles the first expired slot, or silently drops the spawn when nothing
//! has expired. Effects never feed back into gameplay.

use std::collections::VecDeque;

use glam::Vec3;
use rand::Rng;

use crate::data::EffectConfig;

/// Grey used for damage smoke.
pub const SMOKE_COLOR: u32 = 0x55_5555;
/// Lighter grey used for projectile trails.
pub const TRAIL_COLOR: u32 = 0x88_8888;
/// Flame tongue color.
pub const FLAME_COLOR: u32 = 0xff_aa00;
/// Scorch mark color.
pub const DECAL_COLOR: u32 = 0x11_1111;
/// Aiming beam color.
pub const BEAM_COLOR: u32 = 0xff_0000;

// ============================================================================
// Particles
// ============================================================================

/// Per-frame motion rule for a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleBehavior {
    /// Grow outwards at `rate` scale per time-unit.
    Expand {
        /// Scale growth per time-unit.
        rate: f32,
    },
    /// Drift upwards while growing.
    RiseExpand {
        /// Upward speed.
        rise: f32,
        /// Scale growth per time-unit.
        growth: f32,
    },
    /// Fall under gravity and bounce on the floor.
    Ballistic {
        /// Current velocity.
        velocity: Vec3,
        /// Downward acceleration.
        gravity: f32,
        /// Height the fragment bounces on.
        floor: f32,
        /// Fraction of vertical speed kept on bounce.
        restitution: f32,
    },
    /// Advance along a fixed direction while rising and shrinking.
    Drift {
        /// Unit travel direction.
        direction: Vec3,
        /// Travel speed.
        speed: f32,
        /// Upward speed.
        rise: f32,
        /// Scale lost per time-unit.
        shrink: f32,
    },
    /// No motion.
    Static,
}

impl ParticleBehavior {
    fn apply(&mut self, position: &mut Vec3, scale: &mut f32, delta: f32) {
        match self {
            Self::Expand { rate } => *scale += *rate * delta,
            Self::RiseExpand { rise, growth } => {
                position.y += *rise * delta;
                *scale += *growth * delta;
            }
            Self::Ballistic {
                velocity,
                gravity,
                floor,
                restitution,
            } => {
                velocity.y -= *gravity * delta;
                *position += *velocity * delta;
                if position.y < *floor {
                    position.y = *floor;
                    velocity.y *= -*restitution;
                }
            }
            Self::Drift {
                direction,
                speed,
                rise,
                shrink,
            } => {
                *position += *direction * (*speed * delta);
                position.y += *rise * delta;
                *scale -= *shrink * delta;
            }
            Self::Static => {}
        }
    }
}

/// How a particle's rendered scale falls off with age.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fade {
    /// Full scale for the whole life.
    None,
    /// Linear shrink from birth to death.
    Linear,
    /// Full scale until the final `fraction` of life, then a linear shrink.
    Final {
        /// Portion of the lifetime spent shrinking.
        fraction: f32,
    },
}

/// A single pooled particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// World position.
    pub position: Vec3,
    /// Simulated scale (before fading).
    pub scale: f32,
    /// Time since spawn.
    pub age: f32,
    /// Lifetime; the particle is live while `age < life`.
    pub life: f32,
    /// Scale falloff.
    pub fade: Fade,
    /// Color as `0xRRGGBB`.
    pub color: u32,
    /// Cosmetic spin about the vertical axis.
    pub rotation: f32,
    /// Motion rule.
    pub behavior: ParticleBehavior,
}

impl Particle {
    /// Check if the particle is still visible.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.age < self.life
    }

    /// Advance age and run the motion rule.
    pub fn update(&mut self, delta: f32) {
        if !self.is_alive() {
            return;
        }
        self.age += delta;
        self.behavior
            .apply(&mut self.position, &mut self.scale, delta);
    }

    /// Scale to draw at, after fading. Zero once expired.
    #[must_use]
    pub fn render_scale(&self) -> f32 {
        if !self.is_alive() || self.life <= 0.0 {
            return 0.0;
        }
        let factor = match self.fade {
            Fade::None => 1.0,
            Fade::Linear => 1.0 - self.age / self.life,
            Fade::Final { fraction } => {
                let window = self.life * fraction;
                let left = self.life - self.age;
                if window > 0.0 && left < window {
                    left / window
                } else {
                    1.0
                }
            }
        };
        (self.scale * factor).max(0.0)
    }
}

/// What happened to a spawn request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// Stored in a new slot.
    Appended,
    /// Overwrote an expired particle.
    Recycled,
    /// Pool full of live particles; nothing stored.
    Dropped,
}

/// Fixed-capacity particle container.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    capacity: usize,
    particles: Vec<Particle>,
}

impl ParticlePool {
    /// Create an empty pool.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            particles: Vec::with_capacity(capacity),
        }
    }

    /// Store a particle, recycling an expired slot when full.
    pub fn spawn(&mut self, particle: Particle) -> SpawnOutcome {
        if self.particles.len() < self.capacity {
            self.particles.push(particle);
            return SpawnOutcome::Appended;
        }
        match self.particles.iter_mut().find(|p| !p.is_alive()) {
            Some(slot) => {
                *slot = particle;
                SpawnOutcome::Recycled
            }
            None => SpawnOutcome::Dropped,
        }
    }

    /// Update every live particle.
    pub fn advance(&mut self, delta: f32) {
        for particle in &mut self.particles {
            particle.update(delta);
        }
    }

    /// Iterate over visible particles.
    pub fn live(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_alive())
    }

    /// Number of visible particles.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    /// Occupied slots, live or expired.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Check if no slot has ever been used.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Maximum number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

// ============================================================================
// Streaks (tracers and aiming beams)
// ============================================================================

/// A line effect between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Streak {
    /// Origin.
    pub start: Vec3,
    /// End point.
    pub end: Vec3,
    /// Fraction of the path covered by the head (1 for beams).
    pub progress: f32,
    /// Time since spawn.
    pub age: f32,
    /// Lifetime.
    pub life: f32,
    /// Color as `0xRRGGBB`.
    pub color: u32,
}

impl Streak {
    /// Check if the streak is still drawn.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.age < self.life
    }

    /// Current head position.
    #[must_use]
    pub fn head(&self) -> Vec3 {
        self.start.lerp(self.end, self.progress.min(1.0))
    }
}

/// Ring buffer of streaks, overwritten oldest-first.
#[derive(Debug, Clone)]
pub struct StreakRing {
    capacity: usize,
    travel_speed: Option<f32>,
    streaks: VecDeque<Streak>,
}

impl StreakRing {
    /// Create a ring. With a `travel_speed` the head moves from start to end
    /// and the streak expires on arrival; without one the full line shows
    /// for its whole life.
    #[must_use]
    pub fn new(capacity: usize, travel_speed: Option<f32>) -> Self {
        Self {
            capacity,
            travel_speed,
            streaks: VecDeque::with_capacity(capacity),
        }
    }

    /// Add a streak, evicting the oldest when full.
    pub fn push(&mut self, mut streak: Streak) {
        if self.capacity == 0 {
            return;
        }
        if self.travel_speed.is_none() {
            streak.progress = 1.0;
        }
        if self.streaks.len() >= self.capacity {
            self.streaks.pop_front();
        }
        self.streaks.push_back(streak);
    }

    /// Age every streak and advance tracer heads.
    pub fn advance(&mut self, delta: f32) {
        for streak in self.streaks.iter_mut().filter(|s| s.is_alive()) {
            streak.age += delta;
            if let Some(speed) = self.travel_speed {
                streak.progress = (streak.progress + delta * speed).min(1.0);
                if streak.progress >= 1.0 {
                    streak.age = streak.life;
                }
            }
        }
    }

    /// Iterate over visible streaks.
    pub fn live(&self) -> impl Iterator<Item = &Streak> {
        self.streaks.iter().filter(|s| s.is_alive())
    }

    /// Number of stored streaks, live or expired.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streaks.len()
    }

    /// Check if the ring holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streaks.is_empty()
    }

    /// Drop every streak.
    pub fn clear(&mut self) {
        self.streaks.clear();
    }
}

// ============================================================================
// Effect pools
// ============================================================================

/// All effect containers for one match.
#[derive(Debug, Clone)]
pub struct EffectPools {
    config: EffectConfig,
    /// Damage smoke and projectile trails.
    pub smoke: ParticlePool,
    /// Death fragments.
    pub debris: ParticlePool,
    /// Explosion flashes.
    pub explosions: ParticlePool,
    /// Flamethrower tongues.
    pub flames: ParticlePool,
    /// Ground scorch marks.
    pub decals: ParticlePool,
    /// Hit-scan tracers.
    pub tracers: StreakRing,
    /// Channeled aiming beams.
    pub beams: StreakRing,
}

impl EffectPools {
    /// Create empty pools sized by the config.
    #[must_use]
    pub fn new(config: EffectConfig) -> Self {
        Self {
            smoke: ParticlePool::new(config.smoke_capacity),
            debris: ParticlePool::new(config.debris_capacity),
            explosions: ParticlePool::new(config.explosion_capacity),
            flames: ParticlePool::new(config.flame_capacity),
            decals: ParticlePool::new(config.decal_capacity),
            tracers: StreakRing::new(config.tracer_capacity, Some(config.tracer_speed)),
            beams: StreakRing::new(config.beam_capacity, None),
            config,
        }
    }

    /// Capacities and physics constants in use.
    #[must_use]
    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    /// Advance every pool.
    pub fn advance(&mut self, delta: f32) {
        self.smoke.advance(delta);
        self.debris.advance(delta);
        self.explosions.advance(delta);
        self.flames.advance(delta);
        self.decals.advance(delta);
        self.tracers.advance(delta);
        self.beams.advance(delta);
    }

    /// Empty every pool.
    pub fn clear(&mut self) {
        self.smoke.clear();
        self.debris.clear();
        self.explosions.clear();
        self.flames.clear();
        self.decals.clear();
        self.tracers.clear();
        self.beams.clear();
    }

    /// Rising smoke puff.
    pub fn spawn_smoke<R: Rng>(&mut self, position: Vec3, color: u32, size: f32, rng: &mut R) {
        let config = &self.config;
        self.smoke.spawn(Particle {
            position,
            scale: size,
            age: 0.0,
            life: config.smoke_life + rng.gen::<f32>() * config.smoke_life_spread,
            fade: Fade::Linear,
            color,
            rotation: rng.gen::<f32>() * std::f32::consts::TAU,
            behavior: ParticleBehavior::RiseExpand {
                rise: config.smoke_rise,
                growth: config.smoke_growth,
            },
        });
    }

    /// Short smoke puff left behind a projectile.
    pub fn spawn_trail<R: Rng>(&mut self, position: Vec3, rng: &mut R) {
        self.smoke.spawn(Particle {
            position,
            scale: self.config.trail_size,
            age: 0.0,
            life: self.config.trail_life,
            fade: Fade::Linear,
            color: TRAIL_COLOR,
            rotation: rng.gen::<f32>() * std::f32::consts::TAU,
            behavior: ParticleBehavior::Expand {
                rate: self.config.trail_growth,
            },
        });
    }

    /// Burst of bouncing fragments.
    pub fn spawn_debris<R: Rng>(&mut self, position: Vec3, color: u32, rng: &mut R) {
        let speed = self.config.debris_speed;
        for _ in 0..self.config.debris_fragments {
            let velocity = Vec3::new(
                (rng.gen::<f32>() - 0.5) * speed,
                rng.gen::<f32>() * speed,
                (rng.gen::<f32>() - 0.5) * speed,
            );
            self.debris.spawn(Particle {
                position,
                scale: 0.5 + rng.gen::<f32>(),
                age: 0.0,
                life: self.config.debris_life,
                fade: Fade::Linear,
                color,
                rotation: rng.gen::<f32>() * std::f32::consts::TAU,
                behavior: ParticleBehavior::Ballistic {
                    velocity,
                    gravity: self.config.gravity,
                    floor: self.config.debris_floor,
                    restitution: self.config.restitution,
                },
            });
        }
    }

    /// Expanding explosion flash.
    pub fn spawn_explosion(&mut self, position: Vec3, color: u32, size: f32) {
        self.explosions.spawn(Particle {
            position,
            scale: size,
            age: 0.0,
            life: self.config.explosion_life,
            fade: Fade::Linear,
            color,
            rotation: 0.0,
            behavior: ParticleBehavior::Expand {
                rate: self.config.explosion_growth,
            },
        });
    }

    /// Flame tongues travelling from `start` towards `end`.
    pub fn spawn_flame<R: Rng>(&mut self, start: Vec3, end: Vec3, rng: &mut R) {
        let config = self.config;
        let direction = (end - start).normalize_or_zero();
        for _ in 0..config.flame_tongues {
            self.flames.spawn(Particle {
                position: start + direction * (rng.gen::<f32>() * config.flame_reach),
                scale: 0.5 + rng.gen::<f32>(),
                age: 0.0,
                life: config.flame_life,
                fade: Fade::Linear,
                color: FLAME_COLOR,
                rotation: rng.gen::<f32>() * std::f32::consts::TAU,
                behavior: ParticleBehavior::Drift {
                    direction,
                    speed: config.flame_speed,
                    rise: config.flame_rise,
                    shrink: config.flame_shrink,
                },
            });
        }
    }

    /// Scorch mark on the ground.
    pub fn spawn_decal<R: Rng>(&mut self, position: Vec3, size: f32, rng: &mut R) {
        self.decals.spawn(Particle {
            position: Vec3::new(position.x, 0.05, position.z),
            scale: size,
            age: 0.0,
            life: self.config.decal_life,
            fade: Fade::Final {
                fraction: self.config.decal_fade,
            },
            color: DECAL_COLOR,
            rotation: rng.gen::<f32>() * std::f32::consts::PI,
            behavior: ParticleBehavior::Static,
        });
    }

    /// Hit-scan tracer.
    pub fn spawn_tracer(&mut self, start: Vec3, end: Vec3, color: u32) {
        self.tracers.push(Streak {
            start,
            end,
            progress: 0.0,
            age: 0.0,
            life: self.config.tracer_life,
            color,
        });
    }

    /// Non-damaging aiming beam.
    pub fn spawn_beam(&mut self, start: Vec3, end: Vec3) {
        self.beams.push(Streak {
            start,
            end,
            progress: 1.0,
            age: 0.0,
            life: self.config.beam_life,
            color: BEAM_COLOR,
        });
    }
}
