//! Math utilities for the battlefield plane.
//!
//! The battlefield is the x/z plane; y is elevation. Distance checks used for
//! targeting and separation are planar, while projectile contact tests use
//! full 3D distance so lobbed shells can pass over units.

use glam::{Quat, Vec3};
use rand::Rng;

/// Frame rate the per-frame smoothing rates are tuned against.
pub const REFERENCE_FRAME_RATE: f32 = 60.0;

/// Project a point onto the ground plane.
#[must_use]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Squared distance on the ground plane (avoids sqrt for comparisons).
#[must_use]
pub fn planar_distance_squared(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    dx * dx + dz * dz
}

/// Cheap box rejection: true when either axis alone exceeds `reach`.
#[must_use]
pub fn outside_box(a: Vec3, b: Vec3, reach: f32) -> bool {
    (a.x - b.x).abs() > reach || (a.z - b.z).abs() > reach
}

/// Convert a per-frame blend rate into a frame-rate independent factor.
///
/// A rate of 0.1 applied once per 60 Hz frame yields the same convergence as
/// `smoothing_factor(0.1, delta)` applied once per frame of any length.
#[must_use]
pub fn smoothing_factor(rate_per_frame: f32, delta: f32) -> f32 {
    let rate = rate_per_frame.clamp(0.0, 1.0);
    1.0 - (1.0 - rate).powf(delta * REFERENCE_FRAME_RATE)
}

/// Rotation about the vertical axis that faces from `from` towards `to`.
///
/// Returns `None` when the two points coincide on the ground plane.
#[must_use]
pub fn facing(from: Vec3, to: Vec3) -> Option<Quat> {
    let dir = flatten(to - from);
    if dir.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y(dir.x.atan2(dir.z)))
}

/// Ballistic position along an arc at progress `t`.
///
/// Progress is clamped to `[0, 1]`; at `t = 1` the point is exactly `end`
/// regardless of arc height.
#[must_use]
pub fn arc_point(start: Vec3, end: Vec3, arc: f32, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let mut p = start.lerp(end, t);
    p.y += arc * (t * std::f32::consts::PI).sin();
    p
}

/// Uniform draw in `[-width / 2, width / 2]`.
///
/// A zero, negative or non-finite width yields 0 without consuming the RNG.
pub fn centered_roll<R: Rng>(rng: &mut R, width: f32) -> f32 {
    if !(width.is_finite() && width > 0.0) {
        return 0.0;
    }
    let half = width * 0.5;
    rng.gen_range(-half..=half)
}

/// Uniform draw in `[0, upper)`, or 0 when the range is empty.
pub fn phase_roll<R: Rng>(rng: &mut R, upper: f32) -> f32 {
    if !(upper.is_finite() && upper > 0.0) {
        return 0.0;
    }
    rng.gen_range(0.0..upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rolls_stay_in_range_and_tolerate_bad_widths() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..200 {
            let r = centered_roll(&mut rng, 10.0);
            assert!((-5.0..=5.0).contains(&r));
            let p = phase_roll(&mut rng, 0.1);
            assert!((0.0..0.1).contains(&p));
        }
        assert_eq!(centered_roll(&mut rng, -10.0), 0.0);
        assert_eq!(centered_roll(&mut rng, f32::NAN), 0.0);
        assert_eq!(phase_roll(&mut rng, 0.0), 0.0);
        assert_eq!(phase_roll(&mut rng, -1.0), 0.0);
    }

    #[test]
    fn test_planar_distance_ignores_elevation() {
        let a = Vec3::new(3.0, 10.0, 0.0);
        let b = Vec3::new(0.0, -4.0, 4.0);
        // 3² + 4² = 25
        assert!((planar_distance_squared(a, b) - 25.0).abs() < 1e-5);
    }

    #[test]
    fn test_smoothing_factor_matches_reference_frame() {
        let f = smoothing_factor(0.1, 1.0 / REFERENCE_FRAME_RATE);
        assert!((f - 0.1).abs() < 1e-5);

        // Two half frames converge as far as one full frame.
        let half = smoothing_factor(0.1, 0.5 / REFERENCE_FRAME_RATE);
        let combined = 1.0 - (1.0 - half) * (1.0 - half);
        assert!((combined - f).abs() < 1e-5);
    }

    #[test]
    fn test_facing_points_along_positive_z_by_default() {
        let q = facing(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)).unwrap();
        let forward = q * Vec3::Z;
        assert!((forward - Vec3::Z).length() < 1e-5);

        let q = facing(Vec3::ZERO, Vec3::new(10.0, 3.0, 0.0)).unwrap();
        let forward = q * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-5);

        assert!(facing(Vec3::ONE, Vec3::new(1.0, 5.0, 1.0)).is_none());
    }

    #[test]
    fn test_arc_point_lands_on_target() {
        let start = Vec3::new(0.0, 3.0, 0.0);
        let end = Vec3::new(50.0, 0.0, 10.0);
        let landed = arc_point(start, end, 15.0, 1.0);
        assert!((landed - end).length() < 1e-3);

        let apex = arc_point(start, end, 15.0, 0.5);
        assert!((apex.y - (1.5 + 15.0)).abs() < 1e-4);

        // Overshooting progress stays clamped to the landing point.
        assert_eq!(arc_point(start, end, 15.0, 1.7), landed);
    }
}
