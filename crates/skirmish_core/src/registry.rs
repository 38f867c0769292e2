//! The shared entity registry.
//!
//! Presence in the registry is the sole definition of "alive". Anything that
//! remembers an [`EntityId`] re-resolves it on every use and treats a miss as
//! "target gone". Ids come from a generational slot arena, so a recycled slot
//! never resolves for a stale id.

use glam::{Quat, Vec3};
use rand::Rng;
use slotmap::{new_key_type, SlotMap};

use crate::combat::CombatAgent;
use crate::components::Health;
use crate::data::UnitKind;
use crate::factions::Team;
use crate::turret::BaseTurret;

new_key_type! {
    /// Stable handle for units and bases backed by a generational slot map.
    pub struct EntityId;
}

/// What an entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A mobile unit.
    Unit(UnitKind),
    /// A faction base.
    Base,
}

/// Behaviour-specific state carried by an entry.
#[derive(Debug, Clone)]
pub enum Body {
    /// Mobile combat agent.
    Unit(Box<CombatAgent>),
    /// Stationary base turret.
    Base(BaseTurret),
}

/// Result of a damage call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// Health left after the hit (never negative).
    pub remaining: f32,
    /// True only on the alive -> dead transition.
    pub killed: bool,
}

/// A live combatant.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// Owning faction.
    pub team: Team,
    /// Unit kind or base.
    pub kind: EntityKind,
    /// World position (y is elevation).
    pub position: Vec3,
    /// Facing.
    pub orientation: Quat,
    /// Collision radius.
    pub radius: f32,
    /// Health pool.
    pub health: Health,
    /// Behaviour state.
    pub body: Body,
}

impl RegistryEntry {
    /// Apply damage, triggering the body's cosmetic reaction.
    pub fn damage<R: Rng>(&mut self, amount: f32, rng: &mut R) -> DamageOutcome {
        let killed = self.health.apply_damage(amount);
        match &mut self.body {
            Body::Unit(agent) => agent.on_hit(),
            Body::Base(turret) => turret.on_hit(rng),
        }
        DamageOutcome {
            remaining: self.health.current,
            killed,
        }
    }

    /// Check if this entry is a base.
    #[must_use]
    pub fn is_base(&self) -> bool {
        matches!(self.kind, EntityKind::Base)
    }

    /// The combat agent, if this entry is a unit.
    #[must_use]
    pub fn agent(&self) -> Option<&CombatAgent> {
        match &self.body {
            Body::Unit(agent) => Some(&**agent),
            Body::Base(_) => None,
        }
    }

    /// Mutable access to the combat agent, if this entry is a unit.
    pub fn agent_mut(&mut self) -> Option<&mut CombatAgent> {
        match &mut self.body {
            Body::Unit(agent) => Some(&mut **agent),
            Body::Base(_) => None,
        }
    }

    /// The base turret, if this entry is a base.
    #[must_use]
    pub fn turret(&self) -> Option<&BaseTurret> {
        match &self.body {
            Body::Base(turret) => Some(turret),
            Body::Unit(_) => None,
        }
    }
}

/// Id-keyed storage for every live unit and base.
///
/// Iteration order is unspecified; callers that need "nearest" compare
/// distances explicitly.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: SlotMap<EntityId, RegistryEntry>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry under a freshly generated id.
    pub fn register(&mut self, entry: RegistryEntry) -> EntityId {
        self.entries.insert(entry)
    }

    /// Remove an entry; later lookups of `id` miss.
    pub fn unregister(&mut self, id: EntityId) -> Option<RegistryEntry> {
        self.entries.remove(id)
    }

    /// Look up a live entry.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    /// Look up a live entry mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut RegistryEntry> {
        self.entries.get_mut(id)
    }

    /// Check whether `id` is alive.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(id)
    }

    /// Iterate over all live entries.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &RegistryEntry)> {
        self.entries.iter()
    }

    /// Snapshot of all live ids.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.entries.keys().collect()
    }

    /// Snapshot of live unit ids (bases excluded).
    #[must_use]
    pub fn unit_ids(&self) -> Vec<EntityId> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_base())
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of live entries, bases included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live units belonging to `team`.
    #[must_use]
    pub fn count_units(&self, team: Team) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.team == team && !entry.is_base())
            .count()
    }

    /// Opposing entries whose centre lies within `radius` of `point`
    /// (3D, inclusive boundary).
    #[must_use]
    pub fn enemies_within(&self, point: Vec3, radius: f32, attacker: Team) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        self.entries
            .iter()
            .filter(|(_, entry)| {
                entry.team != attacker && entry.position.distance_squared(point) <= radius_sq
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BaseConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn base(team: Team, x: f32) -> RegistryEntry {
        let config = BaseConfig::default();
        RegistryEntry {
            team,
            kind: EntityKind::Base,
            position: Vec3::new(x, config.elevation, 0.0),
            orientation: Quat::IDENTITY,
            radius: config.radius,
            health: Health::new(100.0),
            body: Body::Base(BaseTurret::new(config)),
        }
    }

    #[test]
    fn test_unregistered_id_never_resolves() {
        let mut registry = Registry::new();
        let id = registry.register(base(Team::Red, 0.0));
        assert!(registry.contains(id));
        assert!(registry.unregister(id).is_some());
        assert!(!registry.contains(id));

        // Slot reuse must not revive the stale id.
        let fresh = registry.register(base(Team::Blue, 0.0));
        assert_ne!(fresh, id);
        assert!(registry.get(id).is_none());
    }

    #[test]
    fn test_damage_reports_kill_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut entry = base(Team::Red, 0.0);
        let first = entry.damage(60.0, &mut rng);
        assert_eq!(first.remaining, 40.0);
        assert!(!first.killed);
        assert!(entry.damage(60.0, &mut rng).killed);
        assert!(!entry.damage(60.0, &mut rng).killed);
    }

    #[test]
    fn test_enemies_within_is_inclusive() {
        let mut registry = Registry::new();
        let red = registry.register(base(Team::Red, 10.0));
        let _blue = registry.register(base(Team::Blue, 10.0));
        let hits = registry.enemies_within(Vec3::new(0.0, 2.0, 0.0), 10.0, Team::Blue);
        assert_eq!(hits, vec![red]);
        assert!(registry
            .enemies_within(Vec3::new(0.0, 2.0, 0.0), 9.99, Team::Blue)
            .is_empty());
        assert_eq!(registry.count_units(Team::Red), 0);
    }
}
