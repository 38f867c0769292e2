//! Static terrain obstacles.
//!
//! Obstacles come from an external generator and are read-only for the whole
//! match. Units steer around them; projectiles can be blocked by them.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::data::ProjectileTuning;

/// Footprint class of an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleShape {
    /// Large central peak; circular footprint.
    Mountain,
    /// Boulder; circular footprint.
    Rock,
    /// Wall remnant; square footprint.
    Ruin,
}

/// A static circle (or square) on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Centre x.
    pub x: f32,
    /// Centre z.
    pub z: f32,
    /// Footprint radius (half-width for ruins).
    #[serde(alias = "r")]
    pub radius: f32,
    /// Footprint class.
    #[serde(alias = "type")]
    pub shape: ObstacleShape,
}

impl Obstacle {
    /// Create an obstacle.
    #[must_use]
    pub const fn new(x: f32, z: f32, radius: f32, shape: ObstacleShape) -> Self {
        Self {
            x,
            z,
            radius,
            shape,
        }
    }

    /// Centre on the ground plane.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }

    /// Whether a projectile at `point` is stopped by this obstacle.
    ///
    /// Rocks and mountains block inside a reduced box below their own height;
    /// ruins block inside their full square below a fixed wall height.
    #[must_use]
    pub fn blocks(&self, point: Vec3, tuning: &ProjectileTuning) -> bool {
        let dx = (point.x - self.x).abs();
        let dz = (point.z - self.z).abs();
        match self.shape {
            ObstacleShape::Ruin => {
                dx < self.radius && dz < self.radius && point.y < tuning.ruin_height
            }
            ObstacleShape::Mountain | ObstacleShape::Rock => {
                let reach = self.radius * tuning.rock_footprint;
                dx < reach && dz < reach && point.y < self.radius
            }
        }
    }
}
