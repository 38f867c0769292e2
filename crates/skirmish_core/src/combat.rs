//! Per-unit combat agent: targeting, steering and the attack state machine.
//!
//! An agent splits its work in two. Perception (target choice and the
//! separation push) is expensive and runs on a throttled decision tick.
//! Stepping (steering, attack execution, integration) runs every frame.
//! The agent never touches other entries directly: attacks come back as
//! [`AttackOrder`]s for the simulation to resolve.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::Feedback;
use crate::data::{AgentTuning, AttackStyle, Ballistics, UnitKind, UnitStats};
use crate::factions::Lane;
use crate::math::{facing, flatten, outside_box, planar_distance_squared, smoothing_factor};
use crate::obstacles::Obstacle;
use crate::registry::{EntityId, Registry};

// ============================================================================
// State
// ============================================================================

/// Attack state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentState {
    /// No target; following the lane.
    #[default]
    Marching,
    /// Closing on a target.
    Engaging(EntityId),
    /// Planted within range of a target.
    Attacking(EntityId),
}

impl AgentState {
    /// The target this state refers to, if any.
    #[must_use]
    pub fn target(self) -> Option<EntityId> {
        match self {
            Self::Marching => None,
            Self::Engaging(id) | Self::Attacking(id) => Some(id),
        }
    }
}

/// Broad behaviour label, for metrics and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentActivity {
    /// Following the lane.
    Marching,
    /// Closing on a target.
    Engaging,
    /// Planted and firing.
    Attacking,
}

impl From<AgentState> for AgentActivity {
    fn from(state: AgentState) -> Self {
        match state {
            AgentState::Marching => Self::Marching,
            AgentState::Engaging(_) => Self::Engaging,
            AgentState::Attacking(_) => Self::Attacking,
        }
    }
}

/// Mobile unit state.
#[derive(Debug, Clone)]
pub struct CombatAgent {
    /// Unit kind.
    pub kind: UnitKind,
    /// Stats with upgrades applied at spawn.
    pub stats: UnitStats,
    /// Lane the unit marches along.
    pub lane: Lane,
    /// Current state.
    pub state: AgentState,
    /// Target chosen at the last decision tick; weak, re-resolved every frame.
    pub target: Option<EntityId>,
    /// Time until the next attack is allowed.
    pub cooldown: f32,
    /// Channeled aim accumulated against the current target.
    pub aim_progress: f32,
    /// Current velocity.
    pub velocity: Vec3,
    /// End of the lane (the enemy base line).
    pub waypoint: Vec3,
    /// Lateral offset from the lane centre, fixed at spawn.
    pub formation_offset: f32,
    /// Time accumulated towards the next decision tick.
    pub decision_timer: f32,
    /// Decaying separation impulse.
    pub separation: Vec3,
    /// Cosmetic feedback.
    pub feedback: Feedback,
    hit_flash_duration: f32,
}

/// Result of a decision-tick scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    /// Nearest enemy within aggro range.
    pub target: Option<EntityId>,
    /// Separation push, already scaled to the unit's speed.
    pub separation: Vec3,
}

/// A damage request produced by an agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackOrder {
    /// Instant tracer hit.
    HitScan {
        /// Struck entry.
        target: EntityId,
        /// Tracer origin.
        muzzle: Vec3,
        /// Target position.
        aim: Vec3,
        /// Damage applied.
        damage: f32,
    },
    /// Short-range flame burst.
    Flame {
        /// Struck entry.
        target: EntityId,
        /// Flame origin.
        muzzle: Vec3,
        /// Target position.
        aim: Vec3,
        /// Damage applied.
        damage: f32,
    },
    /// Completed channeled shot.
    Snipe {
        /// Struck entry.
        target: EntityId,
        /// Beam origin.
        muzzle: Vec3,
        /// Target position.
        aim: Vec3,
        /// Damage applied.
        damage: f32,
    },
    /// Single ballistic splash shell.
    Shell {
        /// Launch point.
        muzzle: Vec3,
        /// Aim point captured now.
        aim: Vec3,
        /// Damage on impact.
        damage: f32,
        /// Splash radius.
        splash: f32,
        /// Flight parameters.
        ballistics: Ballistics,
    },
    /// Staggered multi-shot volley.
    Volley {
        /// Launch point.
        muzzle: Vec3,
        /// Target to track while it lives.
        target: EntityId,
        /// Aim point captured now.
        aim: Vec3,
        /// Damage per sub-shot.
        damage_per_shot: f32,
        /// Splash radius per sub-shot.
        splash: f32,
        /// Flight parameters.
        ballistics: Ballistics,
        /// Number of sub-shots.
        shots: u32,
        /// Delay between sub-shots.
        stagger: f32,
        /// Total horizontal scatter.
        jitter: f32,
    },
}

/// Non-damaging beam shown while a channeled shot charges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimWarning {
    /// Beam origin.
    pub start: Vec3,
    /// Beam end (the target).
    pub end: Vec3,
}

/// What one frame of stepping produced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepOutcome {
    /// Attack to resolve this frame.
    pub attack: Option<AttackOrder>,
    /// Charging beam to show this frame.
    pub aim_warning: Option<AimWarning>,
}

// ============================================================================
// Behaviour
// ============================================================================

impl CombatAgent {
    /// Create an agent at the start of its lane.
    #[must_use]
    pub fn new(
        kind: UnitKind,
        stats: UnitStats,
        lane: Lane,
        waypoint: Vec3,
        formation_offset: f32,
        decision_phase: f32,
        hit_flash_duration: f32,
    ) -> Self {
        Self {
            kind,
            stats,
            lane,
            state: AgentState::Marching,
            target: None,
            cooldown: 0.0,
            aim_progress: 0.0,
            velocity: Vec3::ZERO,
            waypoint,
            formation_offset,
            decision_timer: decision_phase,
            separation: Vec3::ZERO,
            feedback: Feedback::default(),
            hit_flash_duration,
        }
    }

    /// Flash after being hit.
    pub fn on_hit(&mut self) {
        self.feedback.hit_flash = self.hit_flash_duration;
    }

    /// Accumulate time; returns `true` when a decision tick is due.
    pub fn tick_decision(&mut self, delta: f32, interval: f32) -> bool {
        self.decision_timer += delta;
        if self.decision_timer >= interval {
            self.decision_timer = 0.0;
            true
        } else {
            false
        }
    }

    /// Adopt the result of a decision-tick scan.
    pub fn apply_perception(&mut self, perception: Perception) {
        self.target = perception.target;
        self.separation = perception.separation;
    }

    /// Forget the current target (it no longer resolves).
    pub fn drop_target(&mut self) {
        self.target = None;
    }

    /// Run one frame of steering and attack logic.
    ///
    /// `target` is the current target's id and live position, resolved by
    /// the caller this frame; `None` when there is no target or it is gone.
    pub fn step(
        &mut self,
        delta: f32,
        position: &mut Vec3,
        orientation: &mut Quat,
        target: Option<(EntityId, Vec3)>,
        tuning: &AgentTuning,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        self.feedback.decay(delta, tuning.recoil_recovery);
        self.cooldown -= delta;

        let mut aim_point = None;
        let mut walking = false;
        let mut locked = false;

        if let Some((target_id, target_pos)) = target {
            aim_point = Some(target_pos);
            let distance = position.distance(target_pos);
            if distance <= self.stats.range && self.cooldown <= tuning.ready_threshold {
                if self.state != AgentState::Attacking(target_id) {
                    self.aim_progress = 0.0;
                }
                self.state = AgentState::Attacking(target_id);
                self.velocity = Vec3::ZERO;
                locked = true;
                if self.cooldown <= 0.0 {
                    self.attack(delta, *position, target_id, target_pos, tuning, &mut outcome);
                }
            } else {
                self.state = AgentState::Engaging(target_id);
                self.aim_progress = 0.0;
                self.steer_towards(*position, target_pos, delta, tuning);
                walking = true;
            }
        } else {
            self.state = AgentState::Marching;
            self.aim_progress = 0.0;
            let goal = Vec3::new(
                self.waypoint.x,
                0.0,
                self.waypoint.z + self.formation_offset,
            );
            if position.distance(self.waypoint) > tuning.arrival_radius {
                self.steer_towards(*position, goal, delta, tuning);
                aim_point = Some(*position + self.velocity);
                walking = true;
            } else {
                let blend = smoothing_factor(tuning.steering_rate, delta);
                self.velocity = self.velocity.lerp(Vec3::ZERO, blend);
            }
        }

        if self.separation.length_squared() > tuning.separation_epsilon {
            self.separation *= tuning.separation_decay;
            self.velocity += self.separation;
            walking = true;
        }

        *position += self.velocity * delta;
        position.y = 0.0;

        if let Some(look) = aim_point.and_then(|aim| facing(*position, aim)) {
            let rate = if locked {
                tuning.turn_rate_locked
            } else {
                tuning.turn_rate_marching
            };
            *orientation = orientation.slerp(look, smoothing_factor(rate, delta));
        }
        self.feedback
            .bob(delta, self.stats.speed, walking && !locked);

        outcome
    }

    fn steer_towards(&mut self, position: Vec3, goal: Vec3, delta: f32, tuning: &AgentTuning) {
        let desired = flatten(goal - position).normalize_or_zero() * self.stats.speed;
        let blend = smoothing_factor(tuning.steering_rate, delta);
        self.velocity = self.velocity.lerp(desired, blend);
    }

    fn attack(
        &mut self,
        delta: f32,
        position: Vec3,
        target: EntityId,
        aim: Vec3,
        tuning: &AgentTuning,
        outcome: &mut StepOutcome,
    ) {
        let UnitStats {
            damage,
            splash,
            attack,
            ballistics,
            ..
        } = self.stats;
        let muzzle = position + Vec3::Y * tuning.muzzle_height;
        let order = match attack {
            AttackStyle::Channeled { aim_time } => {
                self.aim_progress += delta;
                if self.aim_progress < aim_time {
                    outcome.aim_warning = Some(AimWarning {
                        start: position + Vec3::Y * tuning.beam_height,
                        end: aim,
                    });
                    return;
                }
                self.aim_progress = 0.0;
                AttackOrder::Snipe {
                    target,
                    muzzle: position + Vec3::Y * tuning.beam_height,
                    aim,
                    damage,
                }
            }
            AttackStyle::Continuous => AttackOrder::Flame {
                target,
                muzzle: position + Vec3::Y * tuning.flame_muzzle_height,
                aim,
                damage,
            },
            AttackStyle::HitScan => AttackOrder::HitScan {
                target,
                muzzle,
                aim,
                damage,
            },
            AttackStyle::Lobbed => {
                let Some(ballistics) = ballistics else {
                    return;
                };
                AttackOrder::Shell {
                    muzzle,
                    aim,
                    damage,
                    splash,
                    ballistics,
                }
            }
            AttackStyle::Volley {
                shots,
                stagger,
                jitter,
            } => {
                let Some(ballistics) = ballistics else {
                    return;
                };
                AttackOrder::Volley {
                    muzzle,
                    target,
                    aim,
                    damage_per_shot: damage / shots.max(1) as f32,
                    splash,
                    ballistics,
                    shots,
                    stagger,
                    jitter,
                }
            }
        };
        if matches!(
            order,
            AttackOrder::HitScan { .. } | AttackOrder::Shell { .. } | AttackOrder::Volley { .. }
        ) {
            self.feedback.recoil = tuning.recoil_kick;
        }
        self.cooldown = self.stats.cooldown;
        outcome.attack = Some(order);
    }
}

// ============================================================================
// Perception
// ============================================================================

/// Scan the surroundings of `observer` for a target and a separation push.
///
/// Returns `None` if the observer is not a live unit. The target is the
/// enemy with the smallest squared planar distance inside the aggro radius,
/// chosen by comparison so registry order never matters.
#[must_use]
pub fn perceive(
    registry: &Registry,
    obstacles: &[Obstacle],
    observer: EntityId,
    tuning: &AgentTuning,
) -> Option<Perception> {
    let me = registry.get(observer)?;
    let speed = me.agent()?.stats.speed;
    let aggro_sq = tuning.aggro_radius * tuning.aggro_radius;

    let mut push = Vec3::ZERO;
    let mut contacts = 0usize;
    let mut nearest: Option<(EntityId, f32)> = None;

    for (id, other) in registry.iter() {
        if id == observer || outside_box(me.position, other.position, tuning.aggro_radius) {
            continue;
        }
        let dist_sq = planar_distance_squared(me.position, other.position);

        let reach = me.radius + other.radius + tuning.unit_margin;
        if dist_sq < reach * reach {
            let weight = if other.team == me.team {
                tuning.ally_repulsion
            } else {
                tuning.enemy_repulsion
            };
            let away = flatten(me.position - other.position).normalize_or_zero();
            push += away * (reach - dist_sq.sqrt()) * weight;
            contacts += 1;
        }

        if other.team != me.team
            && dist_sq <= aggro_sq
            && nearest.map_or(true, |(_, best)| dist_sq < best)
        {
            nearest = Some((id, dist_sq));
        }
    }

    for obstacle in obstacles {
        let reach = me.radius + obstacle.radius + tuning.obstacle_margin;
        let center = obstacle.center();
        if outside_box(me.position, center, reach) {
            continue;
        }
        let dist_sq = planar_distance_squared(me.position, center);
        if dist_sq < reach * reach {
            let away = flatten(me.position - center).normalize_or_zero();
            push += away * (reach - dist_sq.sqrt()) * tuning.obstacle_repulsion;
            contacts += 1;
        }
    }

    let separation = if contacts > 0 {
        push.normalize_or_zero() * speed * tuning.separation_strength
    } else {
        Vec3::ZERO
    };

    Some(Perception {
        target: nearest.map(|(id, _)| id),
        separation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::UnitRoster;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<EntityId> {
        let mut map: SlotMap<EntityId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn agent(kind: UnitKind) -> CombatAgent {
        let stats = UnitRoster::default().get(kind).clone();
        CombatAgent::new(kind, stats, Lane::Mid, Vec3::new(-350.0, 0.0, 0.0), 0.0, 0.0, 0.2)
    }

    #[test]
    fn test_in_range_unit_stops_and_fires() {
        let tuning = AgentTuning::default();
        let target = ids(1)[0];
        let mut ranger = agent(UnitKind::Ranger);
        ranger.velocity = Vec3::new(-13.0, 0.0, 0.0);
        let mut pos = Vec3::ZERO;
        let mut rot = Quat::IDENTITY;

        let out = ranger.step(
            1.0 / 60.0,
            &mut pos,
            &mut rot,
            Some((target, Vec3::new(-30.0, 0.0, 0.0))),
            &tuning,
        );
        assert_eq!(ranger.state, AgentState::Attacking(target));
        assert_eq!(ranger.velocity, Vec3::ZERO);
        assert!(matches!(out.attack, Some(AttackOrder::HitScan { damage, .. }) if damage == 15.0));
        assert!((ranger.cooldown - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_unit_engages() {
        let tuning = AgentTuning::default();
        let target = ids(1)[0];
        let mut tank = agent(UnitKind::Tank);
        let mut pos = Vec3::ZERO;
        let mut rot = Quat::IDENTITY;
        let out = tank.step(
            0.1,
            &mut pos,
            &mut rot,
            Some((target, Vec3::new(200.0, 0.0, 0.0))),
            &tuning,
        );
        assert_eq!(tank.state, AgentState::Engaging(target));
        assert!(out.attack.is_none());
        assert!(tank.velocity.x > 0.0);
    }

    #[test]
    fn test_channeled_aim_resets_when_target_changes() {
        let tuning = AgentTuning::default();
        let targets = ids(2);
        let mut ghost = agent(UnitKind::Ghost);
        let mut pos = Vec3::ZERO;
        let mut rot = Quat::IDENTITY;
        let near = Vec3::new(50.0, 0.0, 0.0);

        for _ in 0..10 {
            let out = ghost.step(0.1, &mut pos, &mut rot, Some((targets[0], near)), &tuning);
            assert!(out.attack.is_none());
            assert!(out.aim_warning.is_some());
        }
        assert!(ghost.aim_progress > 0.9);

        ghost.step(0.1, &mut pos, &mut rot, Some((targets[1], near)), &tuning);
        assert!(ghost.aim_progress <= 0.1 + 1e-6);

        ghost.step(0.1, &mut pos, &mut rot, None, &tuning);
        assert_eq!(ghost.aim_progress, 0.0);
        assert_eq!(ghost.state, AgentState::Marching);
    }

    #[test]
    fn test_channeled_shot_fires_after_aim_time() {
        let tuning = AgentTuning::default();
        let target = ids(1)[0];
        let mut ghost = agent(UnitKind::Ghost);
        let mut pos = Vec3::ZERO;
        let mut rot = Quat::IDENTITY;
        let aim = Vec3::new(60.0, 0.0, 0.0);

        let mut fired = None;
        for frame in 0..40 {
            let out = ghost.step(0.05, &mut pos, &mut rot, Some((target, aim)), &tuning);
            if let Some(order) = out.attack {
                fired = Some((frame, order));
                break;
            }
        }
        let (frame, order) = fired.expect("ghost should fire");
        // 1.5 time-units of aim at 0.05 per frame.
        assert!((29..=30).contains(&frame));
        assert!(matches!(order, AttackOrder::Snipe { damage, .. } if damage == 350.0));
        assert_eq!(ghost.aim_progress, 0.0);
    }

    #[test]
    fn test_volley_splits_damage() {
        let tuning = AgentTuning::default();
        let target = ids(1)[0];
        let mut thor = agent(UnitKind::Artillery);
        let mut pos = Vec3::ZERO;
        let mut rot = Quat::IDENTITY;
        let out = thor.step(
            0.016,
            &mut pos,
            &mut rot,
            Some((target, Vec3::new(40.0, 0.0, 0.0))),
            &tuning,
        );
        match out.attack {
            Some(AttackOrder::Volley {
                damage_per_shot,
                shots,
                ..
            }) => {
                assert_eq!(shots, 4);
                assert!((damage_per_shot - 6.25).abs() < 1e-6);
            }
            other => panic!("expected volley, got {other:?}"),
        }
    }

    #[test]
    fn test_marching_unit_heads_for_waypoint() {
        let tuning = AgentTuning::default();
        let mut ranger = agent(UnitKind::Ranger);
        let mut pos = Vec3::new(300.0, 0.0, 0.0);
        let mut rot = Quat::IDENTITY;
        for _ in 0..60 {
            ranger.step(1.0 / 60.0, &mut pos, &mut rot, None, &tuning);
        }
        assert_eq!(ranger.state, AgentState::Marching);
        assert!(pos.x < 300.0);
    }

    #[test]
    fn test_decision_tick_throttles() {
        let mut ranger = agent(UnitKind::Ranger);
        let ticks = (0..60)
            .filter(|_| ranger.tick_decision(1.0 / 60.0, 0.1))
            .count();
        assert!((8..=10).contains(&ticks));
    }
}
