//! Data structures for balance configuration.
//!
//! This module contains pure data structures describing unit stats and the
//! tuning tables every system reads. All structs deserialize from RON; the
//! only IO is [`BalanceConfig::load`].

mod balance;
mod unit_data;

pub use balance::{
    AgentTuning, AllyPolicy, BalanceConfig, BaseConfig, BattlefieldConfig, DirectorConfig,
    EconomyConfig, EffectConfig, IncomeStage, LaneLayout, MixStage, MixWeight, OpponentPolicy,
    ProjectileTuning, SkillConfig, UpgradeConfig,
};
pub use unit_data::{AttackStyle, Ballistics, UnitKind, UnitRoster, UnitStats};
