//! Core simulation loop.
//!
//! One [`Simulation`] owns every piece of match state: the registry, the
//! effect pools, projectiles in flight, the scheduler, the economy and the
//! director, plus the seeded RNG every random draw comes from. The host
//! calls [`Simulation::advance`] once per rendered frame with the elapsed
//! time and consumes the returned [`FrameEvents`].
//!
//! # Example
//!
//! ```
//! use skirmish_core::prelude::*;
//!
//! let mut sim = Simulation::new(
//!     BalanceConfig::default(),
//!     Vec::new(),
//!     MatchSettings::default(),
//! );
//!
//! let ranger = sim
//!     .purchase_unit(Team::Blue, UnitKind::Ranger, Some(Lane::Mid))
//!     .expect("starting money covers a ranger");
//! assert!(sim.registry().contains(ranger));
//!
//! let events = sim.advance(1.0 / 60.0);
//! assert!(events.base_destroyed.is_none());
//! ```

use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{perceive, AttackOrder, CombatAgent};
use crate::components::Health;
use crate::data::{BalanceConfig, UnitKind};
use crate::director::{Director, DirectorToggles, Purchase};
use crate::economy::{Economy, UpgradeKind};
use crate::effects::{EffectPools, SMOKE_COLOR};
use crate::error::{Result, SimError};
use crate::events::{
    BaseDamageEvent, DamageEvent, DeathEvent, ExplosionEvent, FireEvent, FireKind, FrameEvents,
    SpawnEvent, StrikeEvent, UpgradeEvent,
};
use crate::factions::{Lane, PerTeam, Team};
use crate::math::{centered_roll, facing, phase_roll};
use crate::obstacles::Obstacle;
use crate::projectile::{ImpactKind, Projectile, ProjectileSim};
use crate::registry::{Body, DamageOutcome, EntityId, EntityKind, Registry, RegistryEntry};
use crate::scheduler::{ScheduledAction, Scheduler};
use crate::turret::{nearest_intruder, BaseTurret};

/// Explosion left where a unit dies.
const DEATH_EXPLOSION_SIZE: f32 = 2.0;
/// Scorch mark left where a unit dies.
const DEATH_DECAL_SIZE: f32 = 4.0;
/// Impact flash of an instant shot.
const IMPACT_FLASH_SIZE: f32 = 1.0;
/// Smoke puff emitted by badly damaged units.
const DAMAGE_SMOKE_SIZE: f32 = 0.5;
/// Height above a unit the damage smoke appears.
const DAMAGE_SMOKE_HEIGHT: f32 = 2.0;
/// Extra roll a damaged unit must pass to smoke on a given frame.
const DAMAGE_SMOKE_GATE: f32 = 0.8;

/// Per-match options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSettings {
    /// Seed for every random draw in the match.
    pub seed: u64,
    /// Run the scripted opponent (Red).
    pub opponent_ai: bool,
    /// Run the automated ally (Blue).
    pub ally_ai: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            opponent_ai: true,
            ally_ai: false,
        }
    }
}

/// Match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Both bases stand.
    Playing,
    /// A base fell.
    Ended {
        /// Faction whose base survived.
        winner: Team,
    },
}

/// The skirmish simulation.
///
/// # Frame Order
///
/// Each call to [`advance`](Self::advance) runs, in order:
/// 1. **Economy** - clock, income, skill cooldowns
/// 2. **Director** - scripted purchases, realised immediately
/// 3. **Combat agents** - decision tick, steering, attacks
/// 4. **Base turrets**
/// 5. **Scheduler** - due volley sub-shots and orbital strikes
/// 6. **Projectiles** - flight, collision, impact damage
/// 7. **Effect pools**
#[derive(Debug, Clone)]
pub struct Simulation {
    config: BalanceConfig,
    obstacles: Vec<Obstacle>,
    settings: MatchSettings,
    registry: Registry,
    effects: EffectPools,
    projectiles: ProjectileSim,
    scheduler: Scheduler,
    economy: Economy,
    director: Director,
    rng: ChaCha8Rng,
    bases: PerTeam<Option<EntityId>>,
    phase: MatchPhase,
    frame: u64,
    pending: FrameEvents,
}

impl Simulation {
    /// Start a match: both bases placed, money at the starting amount.
    #[must_use]
    pub fn new(config: BalanceConfig, obstacles: Vec<Obstacle>, settings: MatchSettings) -> Self {
        let mut sim = Self {
            effects: EffectPools::new(config.effects),
            economy: Economy::new(config.economy.clone()),
            registry: Registry::new(),
            projectiles: ProjectileSim::new(),
            scheduler: Scheduler::new(),
            director: Director::new(),
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            bases: PerTeam::default(),
            phase: MatchPhase::Playing,
            frame: 0,
            pending: FrameEvents::default(),
            config,
            obstacles,
            settings,
        };
        for team in Team::ALL {
            sim.bases[team] = Some(sim.spawn_base(team));
        }
        tracing::info!(
            seed = settings.seed,
            obstacles = sim.obstacles.len(),
            opponent_ai = settings.opponent_ai,
            ally_ai = settings.ally_ai,
            "Match started"
        );
        sim
    }

    /// Discard all match state and start over with the same configuration,
    /// obstacles and settings.
    pub fn reset(&mut self) {
        let obstacles = std::mem::take(&mut self.obstacles);
        *self = Self::new(self.config.clone(), obstacles, self.settings);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Balance data in use.
    #[must_use]
    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// Match options.
    #[must_use]
    pub const fn settings(&self) -> MatchSettings {
        self.settings
    }

    /// Static obstacles.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Live units and bases.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Effect pools, for rendering.
    #[must_use]
    pub fn effects(&self) -> &EffectPools {
        &self.effects
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &ProjectileSim {
        &self.projectiles
    }

    /// Pending deferred actions.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Clock, money and upgrades.
    #[must_use]
    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    /// Elapsed match time.
    #[must_use]
    pub fn clock(&self) -> f32 {
        self.economy.clock()
    }

    /// Frames advanced so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Check if the match is still running.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.phase == MatchPhase::Playing
    }

    /// A faction's base, while it stands.
    #[must_use]
    pub fn base(&self, team: Team) -> Option<EntityId> {
        self.bases[team].filter(|id| self.registry.contains(*id))
    }

    /// A faction's base health (0 once destroyed).
    #[must_use]
    pub fn base_health(&self, team: Team) -> f32 {
        self.base(team)
            .and_then(|id| self.registry.get(id))
            .map_or(0.0, |entry| entry.health.current)
    }

    /// Live units of a faction.
    #[must_use]
    pub fn unit_count(&self, team: Team) -> usize {
        self.registry.count_units(team)
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Advance the match by `delta` time-units.
    ///
    /// Events produced by requests made since the previous frame are
    /// returned with this frame's. Once the match has ended nothing
    /// advances.
    pub fn advance(&mut self, delta: f32) -> FrameEvents {
        let mut events = std::mem::take(&mut self.pending);
        if !self.is_playing() {
            return events;
        }
        self.frame += 1;

        // 1. Economy
        self.economy.advance(delta);

        // 2. Director
        self.run_director(delta, &mut events);

        // 3. Combat agents
        self.run_agents(delta, &mut events);

        // 4. Base turrets
        self.run_turrets(delta, &mut events);

        // 5. Scheduler
        self.run_scheduler(&mut events);

        // 6. Projectiles
        self.run_projectiles(delta, &mut events);

        // 7. Effects
        self.effects.advance(delta);

        events
    }

    fn run_director(&mut self, delta: f32, events: &mut FrameEvents) {
        let toggles = DirectorToggles {
            opponent: self.settings.opponent_ai,
            ally: self.settings.ally_ai,
        };
        let purchases = self.director.update(
            delta,
            toggles,
            &mut self.economy,
            &self.config.director,
            &self.config.units,
            &self.config.upgrades,
            &mut self.rng,
        );
        for purchase in purchases {
            match purchase {
                Purchase::Unit { team, kind } => {
                    let lane = self.random_flank();
                    let id = self.spawn_unit(team, kind, lane);
                    events.spawned.push(SpawnEvent {
                        id,
                        team,
                        kind,
                        lane,
                    });
                }
                Purchase::Upgrade { team, kind } => {
                    let level = self.economy.raise_upgrade(team, kind);
                    tracing::info!(?team, ?kind, level, "Upgrade purchased by director");
                    events.upgrades.push(UpgradeEvent { team, kind, level });
                }
            }
        }
    }

    fn run_agents(&mut self, delta: f32, events: &mut FrameEvents) {
        let tuning = self.config.agent;

        for id in self.registry.unit_ids() {
            let Some(agent) = self.registry.get_mut(id).and_then(RegistryEntry::agent_mut) else {
                // Killed earlier this frame.
                continue;
            };
            if agent.tick_decision(delta, tuning.decision_interval) {
                if let Some(perception) = perceive(&self.registry, &self.obstacles, id, &tuning) {
                    if let Some(agent) = self.registry.get_mut(id).and_then(RegistryEntry::agent_mut)
                    {
                        agent.apply_perception(perception);
                    }
                }
            }

            let remembered = self
                .registry
                .get(id)
                .and_then(RegistryEntry::agent)
                .and_then(|agent| agent.target);
            let target = remembered
                .and_then(|target| self.registry.get(target).map(|entry| (target, entry.position)));

            let Some(entry) = self.registry.get_mut(id) else {
                continue;
            };
            let RegistryEntry {
                team,
                position,
                orientation,
                health,
                body,
                ..
            } = entry;
            let Body::Unit(agent) = body else {
                continue;
            };
            if remembered.is_some() && target.is_none() {
                agent.drop_target();
            }
            let outcome = agent.step(delta, position, orientation, target, &tuning);
            let (team, position, health_fraction) = (*team, *position, health.fraction());

            if health_fraction < tuning.smoke_threshold
                && self.rng.gen::<f32>() > health_fraction / tuning.smoke_threshold
                && self.rng.gen::<f32>() > DAMAGE_SMOKE_GATE
            {
                self.effects.spawn_smoke(
                    position + Vec3::Y * DAMAGE_SMOKE_HEIGHT,
                    SMOKE_COLOR,
                    DAMAGE_SMOKE_SIZE,
                    &mut self.rng,
                );
            }
            if let Some(warning) = outcome.aim_warning {
                self.effects.spawn_beam(warning.start, warning.end);
                events.aim_warnings.push(warning);
            }
            if let Some(order) = outcome.attack {
                self.execute_attack(id, team, order, events);
            }
        }
    }

    fn execute_attack(
        &mut self,
        owner: EntityId,
        team: Team,
        order: AttackOrder,
        events: &mut FrameEvents,
    ) {
        let color = team.color();
        match order {
            AttackOrder::HitScan {
                target,
                muzzle,
                aim,
                damage,
            } => {
                self.effects.spawn_tracer(muzzle, aim, color);
                self.effects.spawn_explosion(aim, color, IMPACT_FLASH_SIZE);
                events
                    .fired
                    .push(fire_event(FireKind::HitScan, team, muzzle, aim, damage, 0.0));
                self.apply_damage(target, damage, events);
            }
            AttackOrder::Flame {
                target,
                muzzle,
                aim,
                damage,
            } => {
                self.effects.spawn_flame(muzzle, aim, &mut self.rng);
                events
                    .fired
                    .push(fire_event(FireKind::Flame, team, muzzle, aim, damage, 0.0));
                self.apply_damage(target, damage, events);
            }
            AttackOrder::Snipe {
                target,
                muzzle,
                aim,
                damage,
            } => {
                self.effects.spawn_tracer(muzzle, aim, color);
                self.effects.spawn_explosion(aim, color, IMPACT_FLASH_SIZE);
                events
                    .fired
                    .push(fire_event(FireKind::Snipe, team, muzzle, aim, damage, 0.0));
                self.apply_damage(target, damage, events);
            }
            AttackOrder::Shell {
                muzzle,
                aim,
                damage,
                splash,
                ballistics,
            } => {
                self.projectiles.fire(Projectile::new(
                    muzzle, aim, ballistics, damage, splash, team,
                ));
                events
                    .fired
                    .push(fire_event(FireKind::Shell, team, muzzle, aim, damage, splash));
            }
            AttackOrder::Volley {
                muzzle,
                target,
                aim,
                damage_per_shot,
                splash,
                ballistics,
                shots,
                stagger,
                jitter,
            } => {
                let now = self.economy.clock();
                for shot in 0..shots {
                    let offset = Vec3::new(centered_roll(&mut self.rng, jitter), 0.0, 0.0);
                    self.scheduler.schedule(
                        now + shot as f32 * stagger,
                        Some(owner),
                        ScheduledAction::VolleyShot {
                            muzzle,
                            target,
                            fallback: aim,
                            jitter: offset,
                            damage: damage_per_shot,
                            splash,
                            ballistics,
                            team,
                        },
                    );
                }
                tracing::debug!(?owner, shots, "Volley scheduled");
            }
        }
    }

    fn run_turrets(&mut self, delta: f32, events: &mut FrameEvents) {
        let defense_radius = self.config.base.defense_radius;

        for team in Team::ALL {
            let Some(id) = self.base(team) else {
                continue;
            };
            let Some(position) = self.registry.get(id).map(|entry| entry.position) else {
                continue;
            };
            let intruder = nearest_intruder(&self.registry, position, team, defense_radius);

            let Some(entry) = self.registry.get_mut(id) else {
                continue;
            };
            let RegistryEntry {
                orientation, body, ..
            } = entry;
            let Body::Base(turret) = body else {
                continue;
            };
            let shot = turret.step(delta, position, intruder, &mut self.rng);
            *orientation = turret.aim;

            if let Some(shot) = shot {
                self.projectiles.fire(Projectile::new(
                    shot.muzzle,
                    shot.aim,
                    shot.ballistics,
                    shot.damage,
                    0.0,
                    team,
                ));
                events.fired.push(fire_event(
                    FireKind::Turret,
                    team,
                    shot.muzzle,
                    shot.aim,
                    shot.damage,
                    0.0,
                ));
            }
        }
    }

    fn run_scheduler(&mut self, events: &mut FrameEvents) {
        for record in self.scheduler.take_due(self.economy.clock()) {
            if record
                .owner
                .is_some_and(|owner| !self.registry.contains(owner))
            {
                continue;
            }
            match record.action {
                ScheduledAction::VolleyShot {
                    muzzle,
                    target,
                    fallback,
                    jitter,
                    damage,
                    splash,
                    ballistics,
                    team,
                } => {
                    let aim = self
                        .registry
                        .get(target)
                        .map_or(fallback, |entry| entry.position)
                        + jitter;
                    self.projectiles.fire(Projectile::new(
                        muzzle, aim, ballistics, damage, splash, team,
                    ));
                    events.fired.push(fire_event(
                        FireKind::VolleyShot,
                        team,
                        muzzle,
                        aim,
                        damage,
                        splash,
                    ));
                }
                ScheduledAction::OrbitalStrike {
                    point,
                    damage,
                    radius,
                    team,
                } => {
                    let victims = self.registry.enemies_within(point, radius, team);
                    self.effects.spawn_explosion(point, team.color(), radius);
                    self.effects.spawn_decal(point, radius, &mut self.rng);
                    events.explosions.push(ExplosionEvent {
                        position: point,
                        radius,
                        damage,
                        team,
                    });
                    events.strikes.push(StrikeEvent {
                        team,
                        point,
                        hits: victims.len(),
                    });
                    tracing::info!(?team, hits = victims.len(), "Orbital strike landed");
                    for victim in victims {
                        self.apply_damage(victim, damage, events);
                    }
                }
            }
        }
    }

    fn run_projectiles(&mut self, delta: f32, events: &mut FrameEvents) {
        let impacts = self.projectiles.advance(
            delta,
            &self.registry,
            &self.obstacles,
            &self.config.projectiles,
            &mut self.effects,
            &mut self.rng,
        );
        for impact in impacts {
            match impact.kind {
                ImpactKind::Direct(id) => {
                    self.apply_damage(id, impact.damage, events);
                }
                ImpactKind::Landed if impact.explodes() => {
                    events.explosions.push(ExplosionEvent {
                        position: impact.position,
                        radius: impact.splash,
                        damage: impact.damage,
                        team: impact.team,
                    });
                    for victim in
                        self.registry
                            .enemies_within(impact.position, impact.splash, impact.team)
                    {
                        self.apply_damage(victim, impact.damage, events);
                    }
                }
                ImpactKind::Landed | ImpactKind::Obstacle => {}
            }
        }
    }

    // ========================================================================
    // Damage and death
    // ========================================================================

    fn apply_damage(
        &mut self,
        id: EntityId,
        amount: f32,
        events: &mut FrameEvents,
    ) -> Option<DamageOutcome> {
        let entry = self.registry.get_mut(id)?;
        let outcome = entry.damage(amount, &mut self.rng);
        let team = entry.team;

        events.damage.push(DamageEvent {
            id,
            team,
            amount,
            remaining: outcome.remaining,
        });
        if entry.is_base() {
            events.base_damage.push(BaseDamageEvent {
                team,
                remaining: outcome.remaining,
            });
        }
        if outcome.killed {
            self.kill(id, events);
        }
        Some(outcome)
    }

    fn kill(&mut self, id: EntityId, events: &mut FrameEvents) {
        let Some(entry) = self.registry.unregister(id) else {
            return;
        };
        let cancelled = self.scheduler.cancel_owner(id);
        let color = entry.team.color();
        let position = entry.position;

        self.effects.spawn_debris(position, color, &mut self.rng);
        self.effects
            .spawn_explosion(position, color, DEATH_EXPLOSION_SIZE);
        self.effects
            .spawn_decal(position, DEATH_DECAL_SIZE, &mut self.rng);
        events.deaths.push(DeathEvent {
            id,
            position,
            color,
            team: entry.team,
            kind: entry.kind,
        });

        match entry.kind {
            EntityKind::Base => {
                let winner = entry.team.opponent();
                self.bases[entry.team] = None;
                events.base_destroyed.get_or_insert(entry.team);
                if self.is_playing() {
                    self.phase = MatchPhase::Ended { winner };
                }
                tracing::info!(
                    loser = entry.team.display_name(),
                    winner = winner.display_name(),
                    clock = self.economy.clock(),
                    "Base destroyed, match over"
                );
            }
            EntityKind::Unit(kind) => {
                tracing::debug!(?id, ?kind, team = ?entry.team, cancelled, "Unit died");
            }
        }
    }

    // ========================================================================
    // Spawning
    // ========================================================================

    fn spawn_base(&mut self, team: Team) -> EntityId {
        let base = self.config.base;
        let position = Vec3::new(
            self.config.battlefield.base_x[team],
            base.elevation,
            0.0,
        );
        let toward_enemy = Vec3::new(self.config.battlefield.enemy_base_x(team), 0.0, 0.0);
        self.registry.register(RegistryEntry {
            team,
            kind: EntityKind::Base,
            position,
            orientation: facing(position, toward_enemy).unwrap_or(Quat::IDENTITY),
            radius: base.radius,
            health: Health::new(base.health),
            body: Body::Base(BaseTurret::new(base)),
        })
    }

    fn random_flank(&mut self) -> Lane {
        if self.rng.gen_bool(0.5) {
            Lane::Top
        } else {
            Lane::Bot
        }
    }

    /// Spawn a unit at its base on `lane` without paying for it.
    ///
    /// The spawn point is scattered across the lane and the unit gets a
    /// random formation offset and decision phase.
    pub fn spawn_unit(&mut self, team: Team, kind: UnitKind, lane: Lane) -> EntityId {
        let battlefield = self.config.battlefield;
        let scatter = centered_roll(&mut self.rng, battlefield.spawn_scatter);
        let position = Vec3::new(
            battlefield.base_x[team],
            0.0,
            battlefield.lane_z(lane) + scatter,
        );
        self.spawn_unit_at(team, kind, lane, position)
    }

    /// Spawn a unit at an exact position without paying for it.
    ///
    /// Current upgrade multipliers of `team` are baked into its stats.
    pub fn spawn_unit_at(
        &mut self,
        team: Team,
        kind: UnitKind,
        lane: Lane,
        position: Vec3,
    ) -> EntityId {
        let battlefield = self.config.battlefield;
        let tuning = self.config.agent;
        let multipliers = self
            .economy
            .upgrades(team)
            .multipliers(self.config.upgrades.step);
        let stats = self.config.units.get(kind).upgraded(multipliers);

        let formation_offset = centered_roll(&mut self.rng, battlefield.formation_spread);
        let decision_phase = phase_roll(&mut self.rng, tuning.decision_interval);
        let waypoint = Vec3::new(battlefield.enemy_base_x(team), 0.0, battlefield.lane_z(lane));
        let position = Vec3::new(position.x, 0.0, position.z);

        let entry = RegistryEntry {
            team,
            kind: EntityKind::Unit(kind),
            position,
            orientation: facing(position, waypoint).unwrap_or(Quat::IDENTITY),
            radius: stats.radius,
            health: Health::new(stats.health),
            body: Body::Unit(Box::new(CombatAgent::new(
                kind,
                stats,
                lane,
                waypoint,
                formation_offset,
                decision_phase,
                tuning.hit_flash,
            ))),
        };
        let id = self.registry.register(entry);
        tracing::debug!(?id, ?team, ?kind, ?lane, "Unit spawned");
        id
    }

    // ========================================================================
    // Requests
    // ========================================================================

    fn ensure_playing(&self) -> Result<()> {
        if self.is_playing() {
            Ok(())
        } else {
            Err(SimError::MatchOver)
        }
    }

    /// Buy a unit for `team`. Without a lane, Top or Bot is picked at
    /// random.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MatchOver`] after a base has fallen and
    /// [`SimError::InsufficientFunds`] if the faction cannot pay; nothing is
    /// spawned or spent in either case.
    pub fn purchase_unit(
        &mut self,
        team: Team,
        kind: UnitKind,
        lane: Option<Lane>,
    ) -> Result<EntityId> {
        self.ensure_playing()?;
        self.economy.try_spend(team, self.config.units.get(kind).cost)?;
        let lane = lane.unwrap_or_else(|| self.random_flank());
        let id = self.spawn_unit(team, kind, lane);
        self.pending.spawned.push(SpawnEvent {
            id,
            team,
            kind,
            lane,
        });
        Ok(id)
    }

    /// Buy one level of an upgrade for `team`. Affects units spawned from
    /// now on.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MatchOver`] or [`SimError::InsufficientFunds`].
    pub fn purchase_upgrade(&mut self, team: Team, kind: UpgradeKind) -> Result<u32> {
        self.ensure_playing()?;
        self.economy.try_spend(team, self.config.upgrades.cost)?;
        let level = self.economy.raise_upgrade(team, kind);
        tracing::info!(?team, ?kind, level, "Upgrade purchased");
        self.pending
            .upgrades
            .push(UpgradeEvent { team, kind, level });
        Ok(level)
    }

    /// Call down an orbital strike on `point`. It lands after the
    /// configured delay and damages every opposing entry in its radius.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MatchOver`], [`SimError::SkillOnCooldown`] or
    /// [`SimError::InsufficientFunds`]. Nothing is spent on error.
    pub fn cast_orbital_strike(&mut self, team: Team, point: Vec3) -> Result<()> {
        self.ensure_playing()?;
        let remaining = self.economy.skill_cooldown(team);
        if remaining > 0.0 {
            return Err(SimError::SkillOnCooldown { remaining });
        }
        let skill = self.config.skill;
        self.economy.try_spend(team, skill.cost)?;
        self.economy.start_skill_cooldown(team, skill.cooldown);
        self.scheduler.schedule(
            self.economy.clock() + skill.delay,
            None,
            ScheduledAction::OrbitalStrike {
                point,
                damage: skill.damage,
                radius: skill.radius,
                team,
            },
        );
        tracing::info!(?team, x = point.x, z = point.z, "Orbital strike called");
        Ok(())
    }

    /// Damage an entry from outside the simulation (scripted events,
    /// tests). Death is handled exactly as for in-match damage.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EntityNotFound`] if `id` is not alive.
    pub fn damage_entity(&mut self, id: EntityId, amount: f32) -> Result<DamageOutcome> {
        let mut events = std::mem::take(&mut self.pending);
        let outcome = self.apply_damage(id, amount, &mut events);
        self.pending = events;
        outcome.ok_or(SimError::EntityNotFound(id))
    }

    /// Remove an entry without a death event. Its scheduled actions are
    /// cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EntityNotFound`] if `id` is not alive.
    pub fn despawn(&mut self, id: EntityId) -> Result<()> {
        let entry = self
            .registry
            .unregister(id)
            .ok_or(SimError::EntityNotFound(id))?;
        self.scheduler.cancel_owner(id);
        if entry.is_base() {
            self.bases[entry.team] = None;
        }
        Ok(())
    }
}

fn fire_event(
    kind: FireKind,
    team: Team,
    start: Vec3,
    target: Vec3,
    damage: f32,
    splash: f32,
) -> FireEvent {
    FireEvent {
        kind,
        team,
        start,
        target,
        color: team.color(),
        damage,
        splash,
    }
}
