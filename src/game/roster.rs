//! Roster management for a pass-the-device game
//!
//! The roster is the ordered list of players taking part. Names are
//! trimmed and must be unique (case-insensitive). Size is bounded by
//! [`RosterLimits`]: starting a round needs at least `min` players, and
//! the roster can never grow past `max`.

use super::{Player, PlayerId};
use crate::error::GameError;

/// Minimum number of players to start a round
pub const MIN_PLAYERS: usize = 3;

/// Default maximum number of players
pub const MAX_PLAYERS: usize = 10;

/// Size bounds for a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterLimits {
    pub min: usize,
    pub max: usize,
}

impl Default for RosterLimits {
    fn default() -> Self {
        Self {
            min: MIN_PLAYERS,
            max: MAX_PLAYERS,
        }
    }
}

/// Ordered list of players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    players: Vec<Player>,
    next_id: u32,
    limits: RosterLimits,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(RosterLimits::default())
    }
}

impl Roster {
    /// Create an empty roster with the given bounds.
    pub fn new(limits: RosterLimits) -> Self {
        Self {
            players: Vec::new(),
            next_id: 1,
            limits,
        }
    }

    /// Build a roster from a list of names, in order.
    #[cfg(test)]
    pub fn from_names<S: AsRef<str>>(limits: RosterLimits, names: &[S]) -> Result<Self, GameError> {
        let mut roster = Self::new(limits);
        for name in names {
            roster.add(name.as_ref())?;
        }
        Ok(roster)
    }

    /// Append a player. Returns the new player's id.
    pub fn add(&mut self, name: &str) -> Result<PlayerId, GameError> {
        if self.players.len() >= self.limits.max {
            return Err(GameError::RosterFull {
                max: self.limits.max,
            });
        }
        let name = self.checked_name(name, None)?;

        let id = PlayerId(self.next_id);
        self.next_id += 1;
        self.players.push(Player::new(id, name));
        Ok(id)
    }

    /// Remove a player. Fails if that would leave fewer than `min` players.
    pub fn remove(&mut self, id: PlayerId) -> Result<Player, GameError> {
        let pos = self.position(id).ok_or(GameError::UnknownPlayer(id))?;
        if self.players.len() <= self.limits.min {
            return Err(GameError::NotEnoughPlayers {
                min: self.limits.min,
                found: self.players.len() - 1,
            });
        }
        Ok(self.players.remove(pos))
    }

    /// Rename a player, with the same name rules as [`Roster::add`].
    pub fn rename(&mut self, id: PlayerId, name: &str) -> Result<(), GameError> {
        let pos = self.position(id).ok_or(GameError::UnknownPlayer(id))?;
        let name = self.checked_name(name, Some(id))?;
        self.players[pos].name = name;
        Ok(())
    }

    /// Check the roster can start a round.
    pub fn check_playable(&self) -> Result<(), GameError> {
        let found = self.players.len();
        if found < self.limits.min {
            return Err(GameError::NotEnoughPlayers {
                min: self.limits.min,
                found,
            });
        }
        if found > self.limits.max {
            return Err(GameError::TooManyPlayers {
                max: self.limits.max,
                found,
            });
        }
        Ok(())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.position(id).is_some()
    }

    /// Display name for a player id, if present.
    pub fn name_of(&self, id: PlayerId) -> Option<&str> {
        self.get(id).map(|p| p.name.as_str())
    }

    #[cfg(test)]
    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.limits.max
    }

    pub fn limits(&self) -> RosterLimits {
        self.limits
    }

    fn position(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// Trim and check a name; `exclude` skips the player being renamed.
    fn checked_name(&self, name: &str, exclude: Option<PlayerId>) -> Result<String, GameError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(GameError::EmptyName);
        }
        let lower = trimmed.to_lowercase();
        let taken = self
            .players
            .iter()
            .filter(|p| Some(p.id) != exclude)
            .any(|p| p.name.to_lowercase() == lower);
        if taken {
            return Err(GameError::DuplicateName(trimmed.to_string()));
        }
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> Roster {
        Roster::from_names(RosterLimits::default(), &["Alice", "Bob", "Charlie"]).unwrap()
    }

    #[test]
    fn test_add_assigns_distinct_ids_in_order() {
        let roster = three();
        assert_eq!(roster.names(), vec!["Alice", "Bob", "Charlie"]);
        let ids = roster.ids();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
    }

    #[test]
    fn test_add_trims_name() {
        let mut roster = Roster::default();
        let id = roster.add("  Dana  ").unwrap();
        assert_eq!(roster.name_of(id), Some("Dana"));
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let mut roster = Roster::default();
        assert_eq!(roster.add("   "), Err(GameError::EmptyName));
        assert_eq!(roster.add(""), Err(GameError::EmptyName));
        assert!(roster.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_name() {
        let mut roster = three();
        assert_eq!(
            roster.add("alice"),
            Err(GameError::DuplicateName("alice".into()))
        );
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn test_add_rejects_when_full() {
        let mut roster = Roster::default();
        for i in 0..MAX_PLAYERS {
            roster.add(&format!("Player {}", i + 1)).unwrap();
        }
        assert!(roster.is_full());
        assert_eq!(
            roster.add("One Too Many"),
            Err(GameError::RosterFull { max: MAX_PLAYERS })
        );
        assert_eq!(roster.len(), MAX_PLAYERS);
    }

    #[test]
    fn test_custom_max() {
        let limits = RosterLimits { min: 3, max: 4 };
        let mut roster = Roster::from_names(limits, &["A", "B", "C", "D"]).unwrap();
        assert_eq!(roster.add("E"), Err(GameError::RosterFull { max: 4 }));
    }

    #[test]
    fn test_remove_player() {
        let mut roster = three();
        let dana = roster.add("Dana").unwrap();
        let removed = roster.remove(dana).unwrap();
        assert_eq!(removed.name, "Dana");
        assert_eq!(roster.len(), 3);
        assert!(!roster.contains(dana));
    }

    #[test]
    fn test_remove_below_minimum_rejected() {
        let mut roster = three();
        let bob = roster.ids()[1];
        assert_eq!(
            roster.remove(bob),
            Err(GameError::NotEnoughPlayers { min: 3, found: 2 })
        );
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn test_remove_unknown_player() {
        let mut roster = three();
        assert_eq!(
            roster.remove(PlayerId(99)),
            Err(GameError::UnknownPlayer(PlayerId(99)))
        );
    }

    #[test]
    fn test_rename_player() {
        let mut roster = three();
        let bob = roster.ids()[1];
        roster.rename(bob, " Robert ").unwrap();
        assert_eq!(roster.name_of(bob), Some("Robert"));
    }

    #[test]
    fn test_rename_to_own_name_with_new_case() {
        let mut roster = three();
        let bob = roster.ids()[1];
        roster.rename(bob, "BOB").unwrap();
        assert_eq!(roster.name_of(bob), Some("BOB"));
    }

    #[test]
    fn test_rename_validation() {
        let mut roster = three();
        let bob = roster.ids()[1];
        assert_eq!(roster.rename(bob, " "), Err(GameError::EmptyName));
        assert_eq!(
            roster.rename(bob, "Charlie"),
            Err(GameError::DuplicateName("Charlie".into()))
        );
        assert_eq!(
            roster.rename(PlayerId(42), "Zed"),
            Err(GameError::UnknownPlayer(PlayerId(42)))
        );
        assert_eq!(roster.name_of(bob), Some("Bob"));
    }

    #[test]
    fn test_ids_not_reused_after_removal() {
        let mut roster = three();
        let dana = roster.add("Dana").unwrap();
        roster.remove(dana).unwrap();
        let erin = roster.add("Erin").unwrap();
        assert_ne!(dana, erin);
    }

    #[test]
    fn test_check_playable() {
        let mut roster = Roster::default();
        roster.add("Alice").unwrap();
        roster.add("Bob").unwrap();
        assert_eq!(
            roster.check_playable(),
            Err(GameError::NotEnoughPlayers { min: 3, found: 2 })
        );
        roster.add("Charlie").unwrap();
        assert!(roster.check_playable().is_ok());
    }
}
