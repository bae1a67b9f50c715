//! Application state: the live session plus everything it needs to advance

use crate::error::GameError;
use crate::game::catalog::CategoryCatalog;
use crate::game::roster::RosterLimits;
use crate::game::session::{Action, PhaseKind, Session};
use crate::stats::HistoryStats;
use crate::storage::{HistoryRecord, HistoryStore, StorageError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

/// Main application state
pub struct App {
    session: Session,
    rng: StdRng,
    catalog: CategoryCatalog,
    history: Option<HistoryStore>,
    /// Category preselected for every new game
    default_category: Option<String>,
    /// Non-fatal problem to show the user (e.g. history could not be saved)
    notice: Option<String>,
}

impl App {
    /// Create the application with an entropy-seeded random source.
    pub fn new(
        limits: RosterLimits,
        catalog: CategoryCatalog,
        history: Option<HistoryStore>,
        default_category: Option<String>,
    ) -> Self {
        let rng = StdRng::from_rng(&mut rand::rng());
        Self::with_rng(limits, catalog, history, default_category, rng)
    }

    /// Create the application with a caller-supplied random source.
    pub fn with_rng(
        limits: RosterLimits,
        catalog: CategoryCatalog,
        history: Option<HistoryStore>,
        default_category: Option<String>,
        rng: StdRng,
    ) -> Self {
        let mut app = Self {
            session: Session::new(limits),
            rng,
            catalog,
            history,
            default_category,
            notice: None,
        };
        app.preselect_category();
        app
    }

    /// Apply an action to the session.
    ///
    /// On success the new session replaces the old one and any finished
    /// round is written to history. On rejection the session is unchanged.
    pub fn dispatch(&mut self, action: Action) -> Result<(), GameError> {
        let is_new_game = action == Action::NewGame;
        let step = match self.session.apply(action, &self.catalog, &mut self.rng) {
            Ok(step) => step,
            Err(e) => {
                warn!(error = %e, phase = %self.session.phase_kind(), "action rejected");
                return Err(e);
            }
        };

        self.session = step.session;
        if let Some(record) = step.completed {
            self.record(&record);
        }
        if is_new_game {
            self.preselect_category();
        }
        Ok(())
    }

    /// From results, go straight into a new round with the same players.
    pub fn rematch(&mut self) -> Result<(), GameError> {
        self.dispatch(Action::PlayAgain)?;
        self.dispatch(Action::StartGame)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> PhaseKind {
        self.session.phase_kind()
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn has_history(&self) -> bool {
        self.history.is_some()
    }

    /// Stored rounds, most recent first. Empty when history is unavailable.
    pub fn history(&self) -> Vec<HistoryRecord> {
        let Some(store) = &self.history else {
            return Vec::new();
        };
        match store.list() {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to read history");
                Vec::new()
            }
        }
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats::from_records(&self.history())
    }

    pub fn clear_history(&mut self) -> Result<(), StorageError> {
        if let Some(store) = &self.history {
            store.clear()?;
            info!("history cleared");
        }
        Ok(())
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn record(&mut self, record: &HistoryRecord) {
        let Some(store) = &self.history else {
            return;
        };
        if let Err(e) = store.append(record) {
            warn!(error = %e, "failed to save round to history");
            self.notice = Some(format!("Round not saved to history: {}", e));
        }
    }

    fn preselect_category(&mut self) {
        let Some(category) = self.default_category.clone() else {
            return;
        };
        if !self.catalog.contains(&category) {
            warn!(%category, "default category not in catalog");
            self.default_category = None;
            return;
        }
        if let Err(e) = self.dispatch(Action::SelectCategory(Some(category))) {
            warn!(error = %e, "ignoring default category");
            self.default_category = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::vote::Outcome;
    use crate::game::PlayerId;
    use crate::storage::DEFAULT_HISTORY_LIMIT;

    fn app(seed: u64) -> App {
        let store = HistoryStore::open_in_memory(DEFAULT_HISTORY_LIMIT).unwrap();
        App::with_rng(
            RosterLimits::default(),
            CategoryCatalog::builtin().clone(),
            Some(store),
            None,
            StdRng::seed_from_u64(seed),
        )
    }

    fn add_players(app: &mut App, names: &[&str]) {
        for name in names {
            app.dispatch(Action::AddPlayer(name.to_string())).unwrap();
        }
    }

    fn reveal_all(app: &mut App) {
        while app.phase() == PhaseKind::Reveal {
            app.dispatch(Action::ShowCard).unwrap();
            app.dispatch(Action::AcknowledgeCard).unwrap();
        }
    }

    #[test]
    fn test_full_round_is_recorded_once() {
        let mut app = app(42);
        add_players(&mut app, &["Alice", "Bob", "Charlie"]);
        app.dispatch(Action::StartGame).unwrap();
        assert_eq!(app.phase(), PhaseKind::Reveal);

        reveal_all(&mut app);
        assert_eq!(app.phase(), PhaseKind::Discuss);
        assert_eq!(app.session().speaking_order().unwrap().len(), 3);
        let first = app.session().first_speaker().unwrap().name.clone();
        assert!(["Alice", "Bob", "Charlie"].contains(&first.as_str()));

        app.dispatch(Action::ShowRules).unwrap();
        let rules = app.session().rules_text().unwrap();
        assert!(rules.iter().any(|line| line.contains("one-word clues")));
        app.dispatch(Action::HideRules).unwrap();
        assert!(app.session().rules_text().is_none());
        assert_eq!(app.phase(), PhaseKind::Discuss);

        app.dispatch(Action::SkipVoting).unwrap();
        assert_eq!(app.phase(), PhaseKind::Results);

        let round = app.session().round().unwrap().clone();
        let history = app.history();
        assert_eq!(history.len(), 1);
        let record = &history[0];
        assert_eq!(record.outcome, Outcome::Skipped);
        assert_eq!(record.word, round.word());
        assert_eq!(record.players, vec!["Alice", "Bob", "Charlie"]);
        assert_eq!(
            Some(record.impostor.as_str()),
            app.session().roster().name_of(round.impostor())
        );

        // Leaving results does not add another record
        app.dispatch(Action::PlayAgain).unwrap();
        assert_eq!(app.history().len(), 1);
    }

    #[test]
    fn test_rejected_action_leaves_session() {
        let mut app = app(1);
        add_players(&mut app, &["Alice", "Bob"]);
        let before = app.session().clone();
        let err = app.dispatch(Action::StartGame).unwrap_err();
        assert_eq!(err, GameError::NotEnoughPlayers { min: 3, found: 2 });
        assert_eq!(app.session(), &before);
        assert!(app.history().is_empty());
    }

    #[test]
    fn test_rematch_starts_new_round() {
        let mut app = app(5);
        add_players(&mut app, &["Alice", "Bob", "Charlie"]);
        app.dispatch(Action::StartGame).unwrap();
        let first = app.session().round().unwrap().id;
        reveal_all(&mut app);
        app.dispatch(Action::Accuse(PlayerId(1))).unwrap();

        app.rematch().unwrap();
        assert_eq!(app.phase(), PhaseKind::Reveal);
        assert_ne!(app.session().round().unwrap().id, first);
        assert_eq!(app.session().roster().len(), 3);
    }

    #[test]
    fn test_new_game_reapplies_default_category() {
        let mut app = App::with_rng(
            RosterLimits::default(),
            CategoryCatalog::builtin().clone(),
            None,
            Some("Food".into()),
            StdRng::seed_from_u64(9),
        );
        assert_eq!(app.session().selected_category(), Some("food"));
        app.dispatch(Action::SelectCategory(None)).unwrap();
        app.dispatch(Action::NewGame).unwrap();
        assert_eq!(app.session().selected_category(), Some("food"));
    }

    #[test]
    fn test_unknown_default_category_is_dropped() {
        let app = App::with_rng(
            RosterLimits::default(),
            CategoryCatalog::builtin().clone(),
            None,
            Some("starships".into()),
            StdRng::seed_from_u64(9),
        );
        assert_eq!(app.session().selected_category(), None);
    }

    #[test]
    fn test_without_history_store() {
        let mut app = App::with_rng(
            RosterLimits::default(),
            CategoryCatalog::builtin().clone(),
            None,
            None,
            StdRng::seed_from_u64(3),
        );
        add_players(&mut app, &["Alice", "Bob", "Charlie"]);
        app.dispatch(Action::StartGame).unwrap();
        reveal_all(&mut app);
        app.dispatch(Action::SkipVoting).unwrap();
        assert!(!app.has_history());
        assert!(app.history().is_empty());
        assert!(app.notice().is_none());
    }

    #[test]
    fn test_failed_append_keeps_results() {
        let mut app = app(13);
        add_players(&mut app, &["Alice", "Bob", "Charlie"]);
        app.dispatch(Action::StartGame).unwrap();
        reveal_all(&mut app);
        app.history
            .as_ref()
            .unwrap()
            .break_history_table()
            .unwrap();

        app.dispatch(Action::SkipVoting).unwrap();
        assert_eq!(app.phase(), PhaseKind::Results);
        assert!(app.session().result().is_some());
        assert!(app.notice().unwrap().contains("not saved"));

        app.dispatch(Action::PlayAgain).unwrap();
        assert_eq!(app.phase(), PhaseKind::Setup);
        assert_eq!(app.session().roster().len(), 3);
    }

    #[test]
    fn test_stats_and_clear() {
        let mut app = app(11);
        add_players(&mut app, &["Alice", "Bob", "Charlie"]);
        for _ in 0..3 {
            app.dispatch(Action::StartGame).unwrap();
            reveal_all(&mut app);
            app.dispatch(Action::SkipVoting).unwrap();
            app.dispatch(Action::PlayAgain).unwrap();
        }
        let stats = app.stats();
        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.skipped, 3);

        app.clear_history().unwrap();
        assert_eq!(app.stats().total_games, 0);
    }
}
