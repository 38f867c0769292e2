//! Proptest strategies for core types.

use glam::Vec3;
use proptest::prelude::*;
use skirmish_core::data::{Ballistics, UnitKind};
use skirmish_core::factions::{Lane, Team};

/// Either faction.
pub fn team() -> impl Strategy<Value = Team> {
    prop_oneof![Just(Team::Red), Just(Team::Blue)]
}

/// Any lane.
pub fn lane() -> impl Strategy<Value = Lane> {
    prop_oneof![Just(Lane::Top), Just(Lane::Mid), Just(Lane::Bot)]
}

/// Any unit kind.
pub fn unit_kind() -> impl Strategy<Value = UnitKind> {
    prop::sample::select(UnitKind::ALL.to_vec())
}

/// A ground-plane point on the battlefield.
pub fn ground_point() -> impl Strategy<Value = Vec3> {
    (-400.0f32..400.0, -200.0f32..200.0).prop_map(|(x, z)| Vec3::new(x, 0.0, z))
}

/// Flight parameters in the range shooters use.
pub fn ballistics() -> impl Strategy<Value = Ballistics> {
    (0.5f32..5.0, 0.0f32..20.0).prop_map(|(speed, arc)| Ballistics { speed, arc })
}

/// A sequence of frame deltas between 1/240 and 1/20.
pub fn frame_deltas(max_len: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(1.0f32 / 240.0..0.05, 1..max_len)
}
