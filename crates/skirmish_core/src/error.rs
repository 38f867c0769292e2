//! Error types for the skirmish simulation.
//!
//! Steady-state play never produces errors: stale targets, pool exhaustion and
//! runaway AI spending are all handled structurally. Errors only surface from
//! request-style operations (purchases, skills, config loading).

use thiserror::Error;

use crate::registry::EntityId;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for all simulation requests.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    /// Failed to read a balance or obstacle file.
    #[error("Failed to load '{path}': {message}")]
    ConfigLoad {
        /// Path to the file that failed to load.
        path: String,
        /// Error message.
        message: String,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    ConfigParse {
        /// Path (or source label) of the data that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// The faction cannot pay for the request.
    #[error("Insufficient funds: need {required:.0}, have {available:.0}")]
    InsufficientFunds {
        /// Amount required.
        required: f32,
        /// Amount available.
        available: f32,
    },

    /// The requested skill is still recharging.
    #[error("Skill on cooldown: {remaining:.1}s remaining")]
    SkillOnCooldown {
        /// Seconds until the skill is ready.
        remaining: f32,
    },

    /// The match has already ended; no further requests are accepted.
    #[error("Match is over")]
    MatchOver,

    /// Invalid entity reference.
    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityId),
}
