//! Future-timestamp action queue.
//!
//! Staggered volley shots and delayed skills are stored as "fires at T"
//! records checked every frame. Records carry an optional owner; removing
//! the owner from the registry cancels its outstanding records.

use glam::Vec3;

use crate::data::Ballistics;
use crate::factions::Team;
use crate::registry::EntityId;

/// A deferred action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduledAction {
    /// One sub-shot of a volley.
    VolleyShot {
        /// Muzzle position when the volley started.
        muzzle: Vec3,
        /// Target to track while it lives.
        target: EntityId,
        /// Fallback aim point captured when the volley was scheduled.
        fallback: Vec3,
        /// Horizontal aim offset.
        jitter: Vec3,
        /// Damage of this sub-shot.
        damage: f32,
        /// Splash radius.
        splash: f32,
        /// Projectile flight.
        ballistics: Ballistics,
        /// Firing faction.
        team: Team,
    },
    /// Area strike landing at a fixed point.
    OrbitalStrike {
        /// Strike centre.
        point: Vec3,
        /// Damage per entry caught.
        damage: f32,
        /// Blast radius (inclusive).
        radius: f32,
        /// Casting faction.
        team: Team,
    },
}

/// A deferred action and its trigger time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledRecord {
    /// Simulation time at which the action fires.
    pub fires_at: f32,
    /// Entity whose death cancels this record.
    pub owner: Option<EntityId>,
    /// What to do.
    pub action: ScheduledAction,
}

/// Pending records, fired in time order.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Vec<ScheduledRecord>,
}

impl Scheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an action.
    pub fn schedule(&mut self, fires_at: f32, owner: Option<EntityId>, action: ScheduledAction) {
        self.pending.push(ScheduledRecord {
            fires_at,
            owner,
            action,
        });
    }

    /// Remove and return every record due at `now`, earliest first.
    pub fn take_due(&mut self, now: f32) -> Vec<ScheduledRecord> {
        let mut due = Vec::new();
        self.pending.retain(|record| {
            if record.fires_at <= now {
                due.push(*record);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.fires_at.total_cmp(&b.fires_at));
        due
    }

    /// Drop every record owned by `owner`. Returns how many were cancelled.
    pub fn cancel_owner(&mut self, owner: EntityId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|record| record.owner != Some(owner));
        before - self.pending.len()
    }

    /// Pending records.
    #[must_use]
    pub fn pending(&self) -> &[ScheduledRecord] {
        &self.pending
    }

    /// Number of pending records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
