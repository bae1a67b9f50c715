//! Error types for game rules
//!
//! Every rejected action maps onto one of three kinds:
//! - Validation: bad input (empty name, roster out of bounds)
//! - NotFound: an id or category that does not exist
//! - InvalidState: an action the current phase does not allow

use crate::game::session::PhaseKind;
use crate::game::PlayerId;
use thiserror::Error;

/// Broad classification of a [`GameError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    InvalidState,
}

/// A rejected roster edit or phase transition.
///
/// The session that produced this error is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Name was empty after trimming
    #[error("player name cannot be empty")]
    EmptyName,

    /// Another player already uses this name (case-insensitive)
    #[error("there is already a player called {0}")]
    DuplicateName(String),

    /// Roster is at the configured maximum
    #[error("roster is full ({max} players max)")]
    RosterFull { max: usize },

    /// Too few players to start, or a removal would go below the minimum
    #[error("need at least {min} players (have {found})")]
    NotEnoughPlayers { min: usize, found: usize },

    /// Too many players to start a round
    #[error("at most {max} players can play (have {found})")]
    TooManyPlayers { max: usize, found: usize },

    /// No player with this id on the roster
    #[error("no player with id {0}")]
    UnknownPlayer(PlayerId),

    /// No category with this name in the catalog
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Action is not allowed in the current phase
    #[error("cannot {action} during {phase}")]
    InvalidState {
        action: &'static str,
        phase: PhaseKind,
    },

    /// Ballot rejected (self-vote, repeat vote, out-of-turn voter)
    #[error("invalid vote: {0}")]
    InvalidVote(String),
}

impl GameError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::EmptyName
            | GameError::DuplicateName(_)
            | GameError::RosterFull { .. }
            | GameError::NotEnoughPlayers { .. }
            | GameError::TooManyPlayers { .. }
            | GameError::InvalidVote(_) => ErrorKind::Validation,
            GameError::UnknownPlayer(_) | GameError::UnknownCategory(_) => ErrorKind::NotFound,
            GameError::InvalidState { .. } => ErrorKind::InvalidState,
        }
    }
}
