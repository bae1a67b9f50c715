//! Role assignment
//!
//! Exactly one player per round is the impostor. Everyone else is shown
//! the shared secret word; the impostor is shown an impostor card instead.

use super::roster::MIN_PLAYERS;
use super::{Player, PlayerId};
use crate::error::GameError;
use rand::prelude::*;
use std::collections::HashMap;

/// Text shown on the impostor's card
pub const IMPOSTOR_LABEL: &str = "IMPOSTER";

/// What a player sees when their card is revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Card {
    /// The shared secret word
    Word(String),
    /// No word: this player is the impostor
    Impostor,
}

impl Card {
    pub fn is_impostor(&self) -> bool {
        matches!(self, Card::Impostor)
    }

    /// Text to render on the card.
    pub fn label(&self) -> &str {
        match self {
            Card::Word(word) => word,
            Card::Impostor => IMPOSTOR_LABEL,
        }
    }
}

/// The outcome of dealing roles for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    word: String,
    impostor: PlayerId,
    cards: HashMap<PlayerId, Card>,
}

impl RoleAssignment {
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn impostor(&self) -> PlayerId {
        self.impostor
    }

    /// The card dealt to a player, if they were dealt in.
    pub fn card_for(&self, id: PlayerId) -> Option<&Card> {
        self.cards.get(&id)
    }

}

/// Pick one impostor uniformly at random and deal the word to everyone else.
///
/// Each call draws independently of any earlier assignment.
pub fn assign_roles<R: Rng + ?Sized>(
    players: &[Player],
    word: &str,
    rng: &mut R,
) -> Result<RoleAssignment, GameError> {
    if players.len() < MIN_PLAYERS {
        return Err(GameError::NotEnoughPlayers {
            min: MIN_PLAYERS,
            found: players.len(),
        });
    }

    let impostor = players[rng.random_range(0..players.len())].id;
    let cards = players
        .iter()
        .map(|p| {
            let card = if p.id == impostor {
                Card::Impostor
            } else {
                Card::Word(word.to_string())
            };
            (p.id, card)
        })
        .collect();

    Ok(RoleAssignment {
        word: word.to_string(),
        impostor,
        cards,
    })
}
