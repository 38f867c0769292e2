//! Balance testing utilities.
//!
//! Closed-form time-to-kill numbers straight from the roster, plus a duel
//! harness that fights two squads in a quiet match and reports who is left.

use skirmish_core::data::{AttackStyle, UnitKind, UnitRoster, UnitStats};
use skirmish_core::factions::Team;
use skirmish_core::simulation::Simulation;

use crate::fixtures::{place, quiet_sim, FRAME};

/// Sustained damage per time-unit, ignoring travel time and splash.
#[must_use]
pub fn damage_per_second(stats: &UnitStats) -> f32 {
    let cycle = match stats.attack {
        AttackStyle::Channeled { aim_time } => stats.cooldown + aim_time,
        _ => stats.cooldown,
    };
    if cycle <= 0.0 {
        return stats.damage;
    }
    stats.damage / cycle
}

/// Time for one `attacker` to kill one `defender` at range.
#[must_use]
pub fn time_to_kill(roster: &UnitRoster, attacker: UnitKind, defender: UnitKind) -> f32 {
    let dps = damage_per_second(roster.get(attacker));
    if dps <= 0.0 {
        return f32::INFINITY;
    }
    roster.get(defender).health / dps
}

/// Time-to-kill for every pairing in the roster.
#[must_use]
pub fn ttk_matrix(roster: &UnitRoster) -> Vec<(UnitKind, UnitKind, f32)> {
    UnitKind::ALL
        .iter()
        .flat_map(|&attacker| {
            UnitKind::ALL
                .iter()
                .map(move |&defender| (attacker, defender, time_to_kill(roster, attacker, defender)))
        })
        .collect()
}

/// A squad for a duel: kind and head count.
pub type Squad = Vec<(UnitKind, u32)>;

/// Outcome of a duel.
#[derive(Debug, Clone, PartialEq)]
pub struct DuelResult {
    /// Faction with survivors when the other has none; `None` on timeout.
    pub winner: Option<Team>,
    /// Match time elapsed.
    pub elapsed: f32,
    /// Red survivors.
    pub red_left: usize,
    /// Blue survivors.
    pub blue_left: usize,
}

/// Fight `red` against `blue` at mid field, `gap` apart, for at most
/// `max_seconds`.
#[must_use]
pub fn run_duel(seed: u64, red: &Squad, blue: &Squad, gap: f32, max_seconds: f32) -> DuelResult {
    let mut sim = quiet_sim(seed);
    deploy(&mut sim, Team::Red, red, -gap * 0.5);
    deploy(&mut sim, Team::Blue, blue, gap * 0.5);

    let max_frames = (max_seconds / FRAME).ceil() as usize;
    for _ in 0..max_frames {
        sim.advance(FRAME);
        if sim.unit_count(Team::Red) == 0 || sim.unit_count(Team::Blue) == 0 {
            break;
        }
    }

    let red_left = sim.unit_count(Team::Red);
    let blue_left = sim.unit_count(Team::Blue);
    let winner = match (red_left, blue_left) {
        (0, 0) => None,
        (_, 0) => Some(Team::Red),
        (0, _) => Some(Team::Blue),
        _ => None,
    };
    tracing::debug!(?winner, red_left, blue_left, elapsed = sim.clock(), "Duel finished");
    DuelResult {
        winner,
        elapsed: sim.clock(),
        red_left,
        blue_left,
    }
}

fn deploy(sim: &mut Simulation, team: Team, squad: &Squad, x: f32) {
    let mut slot = 0.0;
    for &(kind, count) in squad {
        for _ in 0..count {
            place(sim, team, kind, x, slot * 8.0 - 20.0);
            slot += 1.0;
        }
    }
}
