//! Aggregate statistics over the round history
//!
//! Stats are always rebuilt from the stored records rather than kept
//! incrementally, so clearing or trimming history is reflected at once.

use crate::game::vote::Outcome;
use crate::storage::HistoryRecord;
use std::collections::HashMap;

/// Totals across a set of finished rounds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStats {
    /// Rounds played, including skipped votes
    pub total_games: usize,
    /// Rounds where the impostor escaped
    pub impostor_wins: usize,
    /// Rounds where the impostor was caught
    pub crew_wins: usize,
    /// Rounds that ended without a vote
    pub skipped: usize,
    /// Player who has been the impostor most often, with the count
    pub most_frequent_impostor: Option<(String, usize)>,
}

impl HistoryStats {
    /// Compute stats for a list of records (in any order).
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        let mut stats = HistoryStats {
            total_games: records.len(),
            ..Default::default()
        };

        // name -> (times impostor, first position seen)
        let mut impostors: HashMap<&str, (usize, usize)> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            match record.outcome {
                Outcome::ImpostorCaught => stats.crew_wins += 1,
                Outcome::ImpostorEscaped => stats.impostor_wins += 1,
                Outcome::Skipped => stats.skipped += 1,
            }
            impostors.entry(record.impostor.as_str()).or_insert((0, i)).0 += 1;
        }

        // Ties go to whoever appears first in the list
        stats.most_frequent_impostor = impostors
            .into_iter()
            .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
            .map(|(name, (count, _))| (name.to_string(), count));

        stats
    }

    /// Rounds that went to a vote or accusation.
    pub fn decided_games(&self) -> usize {
        self.crew_wins + self.impostor_wins
    }

    /// Percentage of decided rounds the crew won, rounded.
    pub fn crew_win_rate(&self) -> Option<u32> {
        let decided = self.decided_games();
        if decided == 0 {
            None
        } else {
            Some(((self.crew_wins as f64 / decided as f64) * 100.0).round() as u32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(impostor: &str, outcome: Outcome) -> HistoryRecord {
        HistoryRecord {
            id: Uuid::new_v4(),
            category: None,
            word: "pizza".into(),
            players: vec!["Alice".into(), "Bob".into(), "Charlie".into()],
            impostor: impostor.into(),
            accused: None,
            outcome,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_history() {
        let stats = HistoryStats::from_records(&[]);
        assert_eq!(stats, HistoryStats::default());
        assert_eq!(stats.crew_win_rate(), None);
    }

    #[test]
    fn test_counts_by_outcome() {
        let records = vec![
            record("Alice", Outcome::ImpostorCaught),
            record("Bob", Outcome::ImpostorEscaped),
            record("Bob", Outcome::ImpostorCaught),
            record("Charlie", Outcome::Skipped),
        ];
        let stats = HistoryStats::from_records(&records);

        assert_eq!(stats.total_games, 4);
        assert_eq!(stats.crew_wins, 2);
        assert_eq!(stats.impostor_wins, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.decided_games(), 3);
        assert_eq!(stats.most_frequent_impostor, Some(("Bob".to_string(), 2)));
    }

    #[test]
    fn test_win_rate_ignores_skipped_rounds() {
        let records = vec![
            record("Alice", Outcome::ImpostorCaught),
            record("Alice", Outcome::ImpostorCaught),
            record("Bob", Outcome::ImpostorEscaped),
            record("Bob", Outcome::Skipped),
            record("Bob", Outcome::Skipped),
        ];
        // 2 of 3 decided rounds
        assert_eq!(HistoryStats::from_records(&records).crew_win_rate(), Some(67));
    }

    #[test]
    fn test_only_skipped_rounds_have_no_rate() {
        let records = vec![record("Alice", Outcome::Skipped)];
        let stats = HistoryStats::from_records(&records);
        assert_eq!(stats.total_games, 1);
        assert_eq!(stats.crew_win_rate(), None);
    }

    #[test]
    fn test_impostor_tie_prefers_earliest() {
        let records = vec![
            record("Charlie", Outcome::Skipped),
            record("Alice", Outcome::Skipped),
            record("Alice", Outcome::Skipped),
            record("Charlie", Outcome::Skipped),
        ];
        assert_eq!(
            HistoryStats::from_records(&records).most_frequent_impostor,
            Some(("Charlie".to_string(), 2))
        );
    }
}
