//! End-to-end match scenarios.

use glam::Vec3;
use skirmish_core::data::{BalanceConfig, UnitKind};
use skirmish_core::effects::{Fade, Particle, ParticleBehavior, ParticlePool, SpawnOutcome};
use skirmish_core::events::FireKind;
use skirmish_core::factions::Team;
use skirmish_core::obstacles::{Obstacle, ObstacleShape};
use skirmish_core::registry::{EntityId, EntityKind};
use skirmish_core::simulation::{MatchPhase, Simulation};
use skirmish_test_utils::fixtures::{
    ai_sim, distance_between, manual_settings, place, quiet_sim, run_for, run_frames, run_until,
    sample_obstacles, FRAME,
};
use skirmish_test_utils::reproducibility::{fingerprint, verify_reproducible};

fn velocity(sim: &Simulation, id: EntityId) -> Option<Vec3> {
    sim.registry()
        .get(id)
        .and_then(|entry| entry.agent())
        .map(|agent| agent.velocity)
}

#[test]
fn rangers_stop_and_trade_fire_on_contact() {
    let mut sim = quiet_sim(21);
    let red = place(&mut sim, Team::Red, UnitKind::Ranger, -50.0, 0.0);
    let blue = place(&mut sim, Team::Blue, UnitKind::Ranger, 50.0, 0.0);

    let mut damaged_on_entry = false;
    run_until(&mut sim, 600, |sim, events| {
        let closed = distance_between(sim, red, blue).is_some_and(|d| d <= 35.0);
        damaged_on_entry = closed && !events.damage.is_empty();
        closed
    })
    .expect("rangers close to firing range");

    let mut elapsed = 0.0;
    let mut halted_after = None;
    let mut first_damage_after = damaged_on_entry.then_some(0.0);
    for _ in 0..15 {
        let events = sim.advance(FRAME);
        elapsed += FRAME;
        if halted_after.is_none() && velocity(&sim, red) == Some(Vec3::ZERO) {
            halted_after = Some(elapsed);
        }
        if first_damage_after.is_none() && !events.damage.is_empty() {
            first_damage_after = Some(elapsed);
        }
    }

    let halted_after = halted_after.expect("red ranger halts");
    assert!(halted_after <= 0.1 + FRAME, "halted after {halted_after}");
    let first_damage_after = first_damage_after.expect("someone takes damage");
    assert!(first_damage_after <= 0.2, "first damage after {first_damage_after}");
}

fn volley_setup() -> (Simulation, EntityId, EntityId) {
    let mut config = BalanceConfig::default();
    // One volley per test.
    config.units.artillery.cooldown = 100.0;
    let mut sim = Simulation::new(config, Vec::new(), manual_settings(5));
    let thor = place(&mut sim, Team::Red, UnitKind::Artillery, 0.0, 0.0);
    let tank = place(&mut sim, Team::Blue, UnitKind::Tank, 40.0, 0.0);
    (sim, thor, tank)
}

#[test]
fn artillery_volley_lands_four_quarter_hits() {
    let (mut sim, _thor, tank) = volley_setup();

    let mut hits = Vec::new();
    for (frame, events) in run_frames(&mut sim, 240).into_iter().enumerate() {
        hits.extend(
            events
                .damage
                .iter()
                .filter(|event| event.id == tank)
                .map(|event| (frame, event.amount)),
        );
    }

    assert_eq!(hits.len(), 4, "hits: {hits:?}");
    for (_, amount) in &hits {
        assert!((amount - 6.25).abs() < 1e-4);
    }
    assert!(hits.windows(2).all(|pair| pair[0].0 < pair[1].0));
}

#[test]
fn dead_artillery_fires_no_further_sub_shots() {
    let (mut sim, thor, tank) = volley_setup();

    run_until(&mut sim, 120, |_, events| {
        events
            .fired
            .iter()
            .any(|fire| fire.kind == FireKind::VolleyShot)
    })
    .expect("volley starts");
    assert!(!sim.scheduler().is_empty());

    let outcome = sim.damage_entity(thor, 1.0e6).expect("thor alive");
    assert!(outcome.killed);
    assert!(sim.scheduler().is_empty());

    let mut tank_hits = 0;
    let mut volley_shots = 0;
    for events in run_frames(&mut sim, 240) {
        tank_hits += events.damage.iter().filter(|e| e.id == tank).count();
        volley_shots += events
            .fired
            .iter()
            .filter(|fire| fire.kind == FireKind::VolleyShot)
            .count();
    }
    assert_eq!(volley_shots, 0);
    // Only the shell already in flight can land.
    assert_eq!(tank_hits, 1);
}

/// Default balance with formation offsets off and rangers too tough to die
/// during a test.
fn sturdy_config() -> BalanceConfig {
    let mut config = BalanceConfig::default();
    config.battlefield.formation_spread = 0.0;
    config.units.ranger.health = 1.0e5;
    config
}

fn min_gap(sim: &Simulation, ids: &[EntityId]) -> f32 {
    let mut gap = f32::INFINITY;
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            gap = gap.min(distance_between(sim, a, b).expect("both alive"));
        }
    }
    gap
}

#[test]
fn separation_pushes_stacked_allies_apart() {
    let mut sim = Simulation::new(sturdy_config(), Vec::new(), manual_settings(8));
    let squad: Vec<EntityId> = (0..12)
        .map(|i| place(&mut sim, Team::Red, UnitKind::Ranger, -200.0, i as f32 * 0.5))
        .collect();
    assert!(min_gap(&sim, &squad) < 1.0);

    run_frames(&mut sim, 600);

    // Two ranger radii.
    let gap = min_gap(&sim, &squad);
    assert!(gap >= 0.95 * 3.0, "closest pair at {gap}");
}

#[test]
fn separation_holds_enemies_apart_while_they_fight() {
    let mut sim = Simulation::new(sturdy_config(), Vec::new(), manual_settings(17));
    let red = place(&mut sim, Team::Red, UnitKind::Ranger, 0.0, 0.0);
    let blue = place(&mut sim, Team::Blue, UnitKind::Ranger, 0.5, 0.0);

    let mut traded = 0;
    for events in run_frames(&mut sim, 300) {
        traded += events.damage.len();
    }

    assert!(traded > 0, "no shots exchanged");
    let gap = distance_between(&sim, red, blue).expect("both alive");
    assert!(gap >= 0.95 * 3.0, "enemies overlap at {gap}");
    assert!(gap <= 35.0, "enemies drifted out of range at {gap}");
}

#[test]
fn separation_pushes_units_out_of_obstacles() {
    let rock = Obstacle::new(0.0, 0.0, 10.0, ObstacleShape::Rock);
    let mut sim = Simulation::new(sturdy_config(), vec![rock], manual_settings(23));
    // Red plants inside the rock to fire on a blue ranger well within range.
    let red = place(&mut sim, Team::Red, UnitKind::Ranger, 2.0, 0.0);
    let _blue = place(&mut sim, Team::Blue, UnitKind::Ranger, 30.0, 0.0);

    run_frames(&mut sim, 300);

    let entry = sim.registry().get(red).expect("red alive");
    let clearance = Vec3::new(entry.position.x, 0.0, entry.position.z).distance(rock.center());
    // Ranger radius plus rock radius.
    assert!(clearance >= 0.95 * 11.5, "ranger still inside the rock at {clearance}");
}

#[test]
fn flamebat_burns_its_target_every_cycle() {
    let mut sim = quiet_sim(31);
    let _flamebat = place(&mut sim, Team::Red, UnitKind::Flamebat, 0.0, 0.0);
    let tank = place(&mut sim, Team::Blue, UnitKind::Tank, 10.0, 0.0);

    let mut burn_frames = Vec::new();
    let mut flames = 0;
    for (frame, events) in run_frames(&mut sim, 120).into_iter().enumerate() {
        flames += events
            .fired
            .iter()
            .filter(|fire| fire.kind == FireKind::Flame)
            .count();
        for event in events.damage.iter().filter(|event| event.id == tank) {
            assert!((event.amount - 10.0).abs() < 1e-4);
            burn_frames.push(frame);
        }
    }

    // A 0.05 cooldown over two time-units leaves room for dozens of bursts.
    assert!(burn_frames.len() >= 20, "only {} burns", burn_frames.len());
    assert_eq!(flames, burn_frames.len());
    assert!(burn_frames.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(sim.registry().get(tank).is_some());
}

fn target_of(sim: &Simulation, id: EntityId) -> Option<EntityId> {
    sim.registry()
        .get(id)
        .and_then(|entry| entry.agent())
        .and_then(|agent| agent.target)
}

#[test]
fn killed_target_is_replaced_on_the_next_decision_tick() {
    let mut sim = Simulation::new(sturdy_config(), Vec::new(), manual_settings(37));
    let red = place(&mut sim, Team::Red, UnitKind::Ranger, 0.0, 0.0);
    let near = place(&mut sim, Team::Blue, UnitKind::Ranger, 20.0, 0.0);
    let far = place(&mut sim, Team::Blue, UnitKind::Ranger, 0.0, 30.0);

    run_until(&mut sim, 30, |sim, _| target_of(sim, red) == Some(near))
        .expect("red locks onto the nearest enemy");

    let outcome = sim.damage_entity(near, 1.0e6).expect("near alive");
    assert!(outcome.killed);

    let interval = sim.config().agent.decision_interval;
    let frames = (interval / FRAME).ceil() as usize + 1;
    run_until(&mut sim, frames, |sim, _| target_of(sim, red) == Some(far))
        .expect("red retargets within one decision interval");
}

#[test]
fn base_destruction_is_reported_exactly_once() {
    let mut config = BalanceConfig::default();
    config.base.health = 300.0;
    let mut sim = Simulation::new(config, Vec::new(), manual_settings(13));
    place(&mut sim, Team::Blue, UnitKind::Tank, -290.0, -4.0);
    place(&mut sim, Team::Blue, UnitKind::Tank, -290.0, 4.0);

    let mut base_deaths = 0;
    let mut destroyed = Vec::new();
    let ended = run_until(&mut sim, 1800, |_, events| {
        base_deaths += events
            .deaths
            .iter()
            .filter(|death| death.kind == EntityKind::Base)
            .count();
        destroyed.extend(events.base_destroyed);
        events.base_destroyed.is_some()
    });

    assert!(ended.is_some(), "base never fell");
    assert_eq!(base_deaths, 1);
    assert_eq!(destroyed, vec![Team::Red]);
    assert_eq!(sim.phase(), MatchPhase::Ended { winner: Team::Blue });
    assert_eq!(sim.base_health(Team::Red), 0.0);

    for events in run_frames(&mut sim, 60) {
        assert!(events.is_empty());
    }
}

#[test]
fn full_pool_drops_spawns_without_growing() {
    let mut pool = ParticlePool::new(3);
    let particle = Particle {
        position: Vec3::ZERO,
        scale: 1.0,
        age: 0.0,
        life: 10.0,
        fade: Fade::None,
        color: 0xffffff,
        rotation: 0.0,
        behavior: ParticleBehavior::Static,
    };
    for _ in 0..3 {
        assert_eq!(pool.spawn(particle), SpawnOutcome::Appended);
    }
    for _ in 0..10 {
        assert_eq!(pool.spawn(particle), SpawnOutcome::Dropped);
    }
    assert_eq!(pool.len(), 3);
    assert_eq!(pool.capacity(), 3);
}

#[test]
fn scripted_match_keeps_pools_bounded() {
    let mut sim = ai_sim(99, sample_obstacles());
    run_for(&mut sim, 30.0);

    let config = *sim.effects().config();
    assert!(sim.effects().smoke.len() <= config.smoke_capacity);
    assert!(sim.effects().debris.len() <= config.debris_capacity);
    assert!(sim.effects().explosions.len() <= config.explosion_capacity);
    assert!(sim.effects().flames.len() <= config.flame_capacity);
    assert!(sim.effects().decals.len() <= config.decal_capacity);
    assert!(sim.effects().tracers.len() <= config.tracer_capacity);
    assert!(sim.unit_count(Team::Red) + sim.unit_count(Team::Blue) > 0);
}

#[test]
fn seeded_matches_are_reproducible() {
    let result = verify_reproducible(
        2,
        600,
        || ai_sim(4242, sample_obstacles()),
        |sim| {
            sim.advance(FRAME);
        },
        fingerprint,
    );
    result.assert_reproducible();
}
