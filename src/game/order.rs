//! Speaking order for the discussion phase

use super::{Player, PlayerId};
use rand::prelude::*;

/// A shuffled order in which players give their clues, with a cursor on
/// the current speaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakingOrder {
    order: Vec<PlayerId>,
    current: usize,
}

impl SpeakingOrder {
    /// Shuffle the roster into a fresh speaking order.
    pub fn generate<R: Rng + ?Sized>(players: &[Player], rng: &mut R) -> Self {
        let mut order: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
        order.shuffle(rng);
        Self { order, current: 0 }
    }

    /// The player who opens the discussion.
    pub fn first_speaker(&self) -> Option<PlayerId> {
        self.order.first().copied()
    }

    /// The player whose turn it is, or `None` once everyone has spoken.
    pub fn current_speaker(&self) -> Option<PlayerId> {
        self.order.get(self.current).copied()
    }

    /// Move to the next speaker. Returns `true` while someone is still to speak.
    pub fn advance(&mut self) -> bool {
        if self.current < self.order.len() {
            self.current += 1;
        }
        !self.is_complete()
    }

    /// Everyone has had their turn.
    pub fn is_complete(&self) -> bool {
        self.current >= self.order.len()
    }

    /// Index of the current speaker in the order.
    pub fn position(&self) -> usize {
        self.current
    }

    pub fn ids(&self) -> &[PlayerId] {
        &self.order
    }

    /// Number of players in the order.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(PlayerId(i as u32 + 1), format!("P{}", i + 1)))
            .collect()
    }

    #[test]
    fn test_order_is_permutation() {
        let mut rng = StdRng::seed_from_u64(8);
        for n in 3..=10 {
            let roster = players(n);
            let order = SpeakingOrder::generate(&roster, &mut rng);
            assert_eq!(order.len(), n);
            let unique: HashSet<_> = order.ids().iter().copied().collect();
            assert_eq!(unique.len(), n);
            for p in &roster {
                assert!(unique.contains(&p.id));
            }
        }
    }

    #[test]
    fn test_first_speaker_heads_order() {
        let mut rng = StdRng::seed_from_u64(2);
        let order = SpeakingOrder::generate(&players(4), &mut rng);
        assert_eq!(order.first_speaker(), Some(order.ids()[0]));
        assert_eq!(order.current_speaker(), order.first_speaker());
    }

    #[test]
    fn test_advance_until_complete() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut order = SpeakingOrder::generate(&players(3), &mut rng);
        let expected = order.ids().to_vec();

        assert_eq!(order.current_speaker(), Some(expected[0]));
        assert!(order.advance());
        assert_eq!(order.current_speaker(), Some(expected[1]));
        assert!(order.advance());
        assert_eq!(order.current_speaker(), Some(expected[2]));
        assert!(!order.advance());
        assert!(order.is_complete());
        assert_eq!(order.current_speaker(), None);

        // Further advances stay complete
        assert!(!order.advance());
        assert_eq!(order.position(), 3);
        // First speaker is unaffected by progress
        assert_eq!(order.first_speaker(), Some(expected[0]));
    }

    #[test]
    fn test_order_is_randomized() {
        let roster = players(6);
        let mut rng = StdRng::seed_from_u64(1);
        let firsts: HashSet<_> = (0..100)
            .filter_map(|_| SpeakingOrder::generate(&roster, &mut rng).first_speaker())
            .collect();
        assert!(firsts.len() > 1);
    }
}
