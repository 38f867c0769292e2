//! Faction and lane identifiers.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One of the two warring factions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// The Dominion - the scripted opponent, based on the west edge.
    Red,
    /// The Raiders - the player (or automated ally), based on the east edge.
    Blue,
}

impl Team {
    /// Both teams, in a fixed order.
    pub const ALL: [Self; 2] = [Self::Red, Self::Blue];

    /// The opposing faction.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    /// Get the display name for this faction.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Red => "DOMINION",
            Self::Blue => "RAIDERS",
        }
    }

    /// Team color as `0xRRGGBB`, used to tint effects and fire events.
    #[must_use]
    pub const fn color(self) -> u32 {
        match self {
            Self::Red => 0xff2222,
            Self::Blue => 0x0088ff,
        }
    }
}

/// Per-team storage, indexable by [`Team`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerTeam<T> {
    /// Value for [`Team::Red`].
    pub red: T,
    /// Value for [`Team::Blue`].
    pub blue: T,
}

impl<T> PerTeam<T> {
    /// Create with explicit values for each team.
    pub const fn new(red: T, blue: T) -> Self {
        Self { red, blue }
    }
}

impl<T: Clone> PerTeam<T> {
    /// Create with the same value for both teams.
    pub fn splat(value: T) -> Self {
        Self {
            red: value.clone(),
            blue: value,
        }
    }
}

impl<T> Index<Team> for PerTeam<T> {
    type Output = T;

    fn index(&self, team: Team) -> &T {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }
}

impl<T> IndexMut<Team> for PerTeam<T> {
    fn index_mut(&mut self, team: Team) -> &mut T {
        match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        }
    }
}

/// The three marching lanes across the battlefield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    /// Northern lane.
    Top,
    /// Central lane.
    Mid,
    /// Southern lane.
    Bot,
}

impl Lane {
    /// All lanes.
    pub const ALL: [Self; 3] = [Self::Top, Self::Mid, Self::Bot];
}
