//! Simulation benchmarks for skirmish_core.
//!
//! Run with: `cargo bench -p skirmish_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use glam::Vec3;
use skirmish_core::data::{BalanceConfig, UnitKind};
use skirmish_core::factions::{Lane, Team};
use skirmish_core::simulation::{MatchSettings, Simulation};
use skirmish_test_utils::fixtures::{sample_obstacles, FRAME};

/// A mid-field brawl: `per_side` units of every kind on each side.
fn crowded(per_side: usize) -> Simulation {
    let mut sim = Simulation::new(
        BalanceConfig::default(),
        sample_obstacles(),
        MatchSettings {
            seed: 7,
            opponent_ai: false,
            ally_ai: false,
        },
    );
    for i in 0..per_side {
        for (k, kind) in UnitKind::ALL.into_iter().enumerate() {
            let z = (i * UnitKind::ALL.len() + k) as f32 * 3.0 - 150.0;
            sim.spawn_unit_at(Team::Red, kind, Lane::Mid, Vec3::new(-30.0, 0.0, z));
            sim.spawn_unit_at(Team::Blue, kind, Lane::Mid, Vec3::new(30.0, 0.0, z));
        }
    }
    sim
}

/// Runs simulation benchmarks for the skirmish_core crate.
pub fn simulation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    for per_side in [4, 20] {
        group.bench_function(format!("crowded_{}", per_side * UnitKind::ALL.len() * 2), |b| {
            b.iter_batched(
                || crowded(per_side),
                |mut sim| {
                    for _ in 0..10 {
                        black_box(sim.advance(FRAME));
                    }
                    sim
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();

    c.bench_function("scripted_match_60s", |b| {
        b.iter(|| {
            let mut sim = Simulation::new(
                BalanceConfig::default(),
                sample_obstacles(),
                MatchSettings {
                    seed: 1,
                    opponent_ai: true,
                    ally_ai: true,
                },
            );
            for _ in 0..3600 {
                black_box(sim.advance(FRAME));
            }
            sim.clock()
        });
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
