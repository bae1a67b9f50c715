//! Voting: ballots, tallies and the round verdict
//!
//! Ballots are cast one player at a time in roster order. Nobody may
//! vote for themselves or vote twice. The single most-voted player is
//! accused; a tie at the top accuses nobody and the impostor escapes.

use super::{Player, PlayerId};
use crate::error::GameError;
use serde::{Deserialize, Serialize};

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The accused player was the impostor
    ImpostorCaught,
    /// Someone else (or nobody) was accused
    ImpostorEscaped,
    /// The group skipped voting and just revealed the answer
    Skipped,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::ImpostorCaught => "Impostor caught",
            Outcome::ImpostorEscaped => "Impostor escaped",
            Outcome::Skipped => "Skipped vote",
        }
    }

    /// Decide the outcome for an accusation.
    pub fn judge(accused: Option<PlayerId>, impostor: PlayerId) -> Self {
        match accused {
            Some(id) if id == impostor => Outcome::ImpostorCaught,
            _ => Outcome::ImpostorEscaped,
        }
    }
}

/// Votes received by one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteCount {
    pub player: PlayerId,
    pub votes: usize,
}

/// Ballots cast so far in a formal vote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ballots {
    /// (voter, suspect) in casting order
    cast: Vec<(PlayerId, PlayerId)>,
}

impl Ballots {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next player due to vote, in roster order.
    pub fn next_voter(&self, players: &[Player]) -> Option<PlayerId> {
        players
            .iter()
            .map(|p| p.id)
            .find(|id| !self.has_voted(*id))
    }

    /// Record a ballot. The voter must be the next player due to vote.
    pub fn cast(
        &mut self,
        players: &[Player],
        voter: PlayerId,
        suspect: PlayerId,
    ) -> Result<(), GameError> {
        if !players.iter().any(|p| p.id == voter) {
            return Err(GameError::UnknownPlayer(voter));
        }
        if !players.iter().any(|p| p.id == suspect) {
            return Err(GameError::UnknownPlayer(suspect));
        }
        if self.has_voted(voter) {
            return Err(GameError::InvalidVote(format!("{} has already voted", voter)));
        }
        if voter == suspect {
            return Err(GameError::InvalidVote("players cannot vote for themselves".into()));
        }
        if self.next_voter(players) != Some(voter) {
            return Err(GameError::InvalidVote(format!("it is not {}'s turn to vote", voter)));
        }

        self.cast.push((voter, suspect));
        Ok(())
    }

    pub fn has_voted(&self, voter: PlayerId) -> bool {
        self.cast.iter().any(|(v, _)| *v == voter)
    }

    /// Every player on the roster has voted.
    pub fn is_complete(&self, players: &[Player]) -> bool {
        players.iter().all(|p| self.has_voted(p.id))
    }

    /// Votes per player, most votes first. Ties keep roster order.
    pub fn tally(&self, players: &[Player]) -> Vec<VoteCount> {
        let mut counts: Vec<VoteCount> = players
            .iter()
            .map(|p| VoteCount {
                player: p.id,
                votes: self.cast.iter().filter(|(_, s)| *s == p.id).count(),
            })
            .collect();
        counts.sort_by(|a, b| b.votes.cmp(&a.votes));
        counts
    }

    /// The single most-voted player, or `None` on a tie or with no votes.
    pub fn most_voted(&self, players: &[Player]) -> Option<PlayerId> {
        let tally = self.tally(players);
        let top = tally.first()?;
        if top.votes == 0 {
            return None;
        }
        let tied = tally.iter().filter(|c| c.votes == top.votes).count();
        if tied > 1 {
            None
        } else {
            Some(top.player)
        }
    }

    pub fn len(&self) -> usize {
        self.cast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cast.is_empty()
    }
}
