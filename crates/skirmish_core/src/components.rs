//! Shared component definitions.
//!
//! Components are small data holders shared by units and bases. Every timer
//! here is a countdown decremented by simulation time, never a wall-clock
//! timer or a deferred callback.

use glam::Vec3;
use serde::{Deserialize, Serialize};

// ============================================================================
// Health
// ============================================================================

/// Health component for damageable entities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: f32,
    /// Maximum health points.
    pub max: f32,
}

impl Health {
    /// Create new health component at full health.
    #[must_use]
    pub const fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Check if entity is dead (health <= 0).
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Apply damage, returning `true` only on the alive -> dead transition.
    ///
    /// Health is clamped at zero, so repeated hits on a dead entity never
    /// report a second death.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        let was_alive = !self.is_dead();
        self.current = (self.current - amount.max(0.0)).max(0.0);
        was_alive && self.is_dead()
    }

    /// Health as a fraction of maximum (0.0 - 1.0).
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }
}

// ============================================================================
// Visual feedback
// ============================================================================

/// Cosmetic per-unit feedback. Nothing here feeds back into gameplay.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Feedback {
    /// Remaining white hit-flash time.
    pub hit_flash: f32,
    /// Recoil displacement away from the aim point.
    pub recoil: f32,
    /// Walk-cycle phase driving the idle bob.
    pub bob_phase: f32,
    /// Current bob height above the ground.
    pub bob_height: f32,
}

impl Feedback {
    /// Decay flash and recoil by elapsed time.
    pub fn decay(&mut self, delta: f32, recoil_recovery: f32) {
        self.hit_flash = (self.hit_flash - delta).max(0.0);
        self.recoil = (self.recoil - delta * recoil_recovery).max(0.0);
    }

    /// Advance the walk bob while marching, or settle it while planted.
    pub fn bob(&mut self, delta: f32, speed: f32, walking: bool) {
        if walking {
            self.bob_phase += delta * 5.0 * speed;
            self.bob_height = self.bob_phase.sin().abs() * 0.5;
        } else {
            self.bob_height = 0.0;
        }
    }

    /// Whether the hit flash is showing.
    #[must_use]
    pub fn flashing(&self) -> bool {
        self.hit_flash > 0.0
    }
}

/// Bounded, self-reverting positional shake for a base.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Shake {
    /// Time until the offset reverts to zero.
    pub remaining: f32,
    /// Current render offset.
    pub offset: Vec3,
}

impl Shake {
    /// Start (or restart) a shake with the given offset.
    pub fn kick(&mut self, offset: Vec3, duration: f32) {
        self.offset = offset;
        self.remaining = duration;
    }

    /// Count down and revert once elapsed.
    pub fn advance(&mut self, delta: f32) {
        if self.remaining > 0.0 {
            self.remaining -= delta;
            if self.remaining <= 0.0 {
                self.remaining = 0.0;
                self.offset = Vec3::ZERO;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_reports_death_once() {
        let mut health = Health::new(100.0);
        assert!(!health.apply_damage(60.0));
        assert!(health.apply_damage(60.0));
        assert_eq!(health.current, 0.0);
        assert!(!health.apply_damage(60.0));
        assert!(health.is_dead());
    }

    #[test]
    fn test_health_ignores_negative_damage() {
        let mut health = Health::new(50.0);
        health.apply_damage(-20.0);
        assert_eq!(health.current, 50.0);
        assert_eq!(health.fraction(), 1.0);
    }

    #[test]
    fn test_feedback_decays_to_zero() {
        let mut feedback = Feedback {
            hit_flash: 0.2,
            recoil: 1.5,
            ..Default::default()
        };
        feedback.decay(0.1, 5.0);
        assert!(feedback.flashing());
        assert!((feedback.recoil - 1.0).abs() < 1e-5);
        feedback.decay(1.0, 5.0);
        assert!(!feedback.flashing());
        assert_eq!(feedback.recoil, 0.0);
    }

    #[test]
    fn test_shake_reverts() {
        let mut shake = Shake::default();
        shake.kick(Vec3::new(0.2, 0.0, -0.1), 0.05);
        shake.advance(0.03);
        assert_ne!(shake.offset, Vec3::ZERO);
        shake.advance(0.03);
        assert_eq!(shake.offset, Vec3::ZERO);
        assert_eq!(shake.remaining, 0.0);
    }
}
