//! Reproducibility harness for seeded matches.
//!
//! Every random draw in a match comes from the seeded RNG owned by the
//! simulation, so two runs built the same way on the same machine must end
//! in the same state. This is a testing aid, not a replay or lockstep
//! guarantee: floating-point results may still differ across platforms.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use skirmish_core::simulation::Simulation;

/// Result of a reproducibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReproducibilityResult {
    /// Whether all runs produced identical fingerprints.
    pub is_reproducible: bool,
    /// Fingerprints from each run.
    pub fingerprints: Vec<u64>,
    /// Number of frames simulated per run.
    pub frames: usize,
}

impl ReproducibilityResult {
    /// Get all unique fingerprints (should be 1).
    #[must_use]
    pub fn unique_fingerprints(&self) -> Vec<u64> {
        let mut unique = self.fingerprints.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different fingerprints.
    pub fn assert_reproducible(&self) {
        if !self.is_reproducible {
            panic!(
                "Seeded runs diverged!\n\
                 Runs: {}\n\
                 Frames: {}\n\
                 Unique fingerprints: {} (expected 1)\n\
                 All fingerprints: {:?}",
                self.fingerprints.len(),
                self.frames,
                self.unique_fingerprints().len(),
                self.fingerprints
            );
        }
    }
}

/// Run a setup `runs` times, step each `frames` times and compare
/// fingerprints.
pub fn verify_reproducible<S, Setup, Step, Fingerprint>(
    runs: usize,
    frames: usize,
    setup: Setup,
    step: Step,
    fingerprint: Fingerprint,
) -> ReproducibilityResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    Fingerprint: Fn(&S) -> u64,
{
    let fingerprints: Vec<u64> = (0..runs)
        .map(|_| {
            let mut state = setup();
            for _ in 0..frames {
                step(&mut state);
            }
            fingerprint(&state)
        })
        .collect();

    ReproducibilityResult {
        is_reproducible: fingerprints.windows(2).all(|w| w[0] == w[1]),
        fingerprints,
        frames,
    }
}

/// Hash of the observable match state: clock, money, and every live
/// entry's team, health and position bits, in a registry-order independent
/// way.
#[must_use]
pub fn fingerprint(sim: &Simulation) -> u64 {
    let mut rows: Vec<(u8, u32, [u32; 3])> = sim
        .registry()
        .iter()
        .map(|(_, entry)| {
            (
                entry.team as u8,
                entry.health.current.to_bits(),
                [
                    entry.position.x.to_bits(),
                    entry.position.y.to_bits(),
                    entry.position.z.to_bits(),
                ],
            )
        })
        .collect();
    rows.sort_unstable();

    let mut hasher = DefaultHasher::new();
    sim.clock().to_bits().hash(&mut hasher);
    for team in skirmish_core::factions::Team::ALL {
        sim.economy().money(team).to_bits().hash(&mut hasher);
    }
    rows.hash(&mut hasher);
    sim.projectiles().len().hash(&mut hasher);
    hasher.finish()
}
