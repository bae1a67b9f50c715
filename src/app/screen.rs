//! Application screen state management
//!
//! Handles transitions between the application screens:
//! - Game (whatever phase the session is in)
//! - History of past rounds
//!
//! Key handling is phase-aware: the same key means different things during
//! setup, reveal, discussion, voting and results.

use crate::error::{ErrorKind, GameError};
use crate::game::session::{Action, PhaseKind};
use crate::game::PlayerId;

use super::state::App;

/// The current application screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// The running game, rendered according to the session phase
    Game,
    /// Past rounds, with a scroll offset
    History { scroll: usize },
}

/// A message for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub message: String,
    /// Kind of the rejected action; `None` for startup and storage problems
    pub kind: Option<ErrorKind>,
}

impl Feedback {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
        }
    }
}

impl From<GameError> for Feedback {
    fn from(e: GameError) -> Self {
        Self {
            message: e.to_string(),
            kind: Some(e.kind()),
        }
    }
}

/// Main application coordinator
pub struct AppCoordinator {
    pub app: App,
    /// Current screen
    pub screen: Screen,
    /// Name being typed during setup
    pub input: String,
    /// Player being renamed, if the input is editing an existing name
    pub renaming: Option<PlayerId>,
    /// Highlighted row in the roster or suspect list
    pub selected: usize,
    /// Feedback from the last rejected action or a non-fatal problem
    pub feedback: Option<Feedback>,
    /// Whether the application should quit
    pub should_quit: bool,
}

impl AppCoordinator {
    pub fn new(app: App) -> Self {
        Self {
            app,
            screen: Screen::Game,
            input: String::new(),
            renaming: None,
            selected: 0,
            feedback: None,
            should_quit: false,
        }
    }

    /// Report a problem that does not stop play, keeping earlier warnings.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        let message = match self.feedback.take() {
            Some(earlier) if earlier.kind.is_none() => format!("{}; {}", earlier.message, message),
            _ => message,
        };
        self.feedback = Some(Feedback::warning(message));
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Send an action to the session, keeping any rejection as feedback.
    fn act(&mut self, action: Action) {
        self.app.dismiss_notice();
        match self.app.dispatch(action) {
            Ok(()) => {
                self.feedback = None;
                self.clamp_selection();
            }
            Err(e) => self.feedback = Some(e.into()),
        }
    }

    fn rematch(&mut self) {
        self.app.dismiss_notice();
        self.feedback = self.app.rematch().err().map(Feedback::from);
    }

    fn selected_player(&self) -> Option<PlayerId> {
        self.app
            .session()
            .roster()
            .players()
            .get(self.selected)
            .map(|p| p.id)
    }

    fn clamp_selection(&mut self) {
        let len = self.app.session().roster().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Esc: leave the current screen, or quit from the game.
    pub fn on_escape(&mut self) {
        match self.screen {
            Screen::Game if self.renaming.is_some() => {
                self.renaming = None;
                self.input.clear();
            }
            Screen::Game => self.quit(),
            Screen::History { .. } => self.screen = Screen::Game,
        }
    }

    /// Toggle between the game and the history screen.
    pub fn toggle_history(&mut self) {
        self.screen = match self.screen {
            Screen::History { .. } => Screen::Game,
            Screen::Game => Screen::History { scroll: 0 },
        };
    }

    /// Abandon the current game and start over with an empty roster.
    pub fn new_game(&mut self) {
        if self.screen == Screen::Game {
            self.input.clear();
            self.renaming = None;
            self.selected = 0;
            self.act(Action::NewGame);
        }
    }

    pub fn on_up(&mut self) {
        match &mut self.screen {
            Screen::History { scroll } => *scroll = scroll.saturating_sub(1),
            Screen::Game => self.selected = self.selected.saturating_sub(1),
        }
    }

    pub fn on_down(&mut self) {
        match &mut self.screen {
            Screen::History { scroll } => *scroll += 1,
            Screen::Game => {
                if self.selected + 1 < self.app.session().roster().len() {
                    self.selected += 1;
                }
            }
        }
    }

    /// Cycle the category selection during setup (`None` = any).
    pub fn cycle_category(&mut self, forward: bool) {
        if self.screen != Screen::Game || self.app.phase() != PhaseKind::Setup {
            return;
        }
        let names: Vec<String> = self
            .app
            .catalog()
            .list_categories()
            .into_iter()
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            return;
        }

        // Position 0 is "any category", then each named category
        let current = self
            .app
            .session()
            .selected_category()
            .and_then(|c| names.iter().position(|n| n == c))
            .map_or(0, |i| i + 1);
        let slots = names.len() + 1;
        let next = if forward {
            (current + 1) % slots
        } else {
            (current + slots - 1) % slots
        };
        let category = next.checked_sub(1).map(|i| names[i].clone());
        self.act(Action::SelectCategory(category));
    }

    pub fn on_char(&mut self, c: char) {
        match self.screen {
            Screen::Game => {}
            Screen::History { .. } => {
                if c == 'c' {
                    if let Err(e) = self.app.clear_history() {
                        self.warn(e.to_string());
                    }
                }
                return;
            }
        }

        match self.app.phase() {
            PhaseKind::Setup => {
                if !c.is_control() {
                    self.input.push(c);
                }
            }
            PhaseKind::Reveal => {
                if c == ' ' {
                    self.on_enter();
                }
            }
            PhaseKind::Discuss => match c {
                'n' => self.act(Action::NextSpeaker),
                'r' => {
                    let showing = self.app.session().rules_text().is_some();
                    self.act(if showing {
                        Action::HideRules
                    } else {
                        Action::ShowRules
                    });
                }
                'v' => {
                    self.selected = 0;
                    self.act(Action::StartVoting);
                }
                's' => self.act(Action::SkipVoting),
                'a' => {
                    if let Some(suspect) = self.selected_player() {
                        self.act(Action::Accuse(suspect));
                    }
                }
                _ => {}
            },
            PhaseKind::Vote => {}
            PhaseKind::Results => match c {
                'r' => self.rematch(),
                's' => self.act(Action::PlayAgain),
                _ => {}
            },
        }
    }

    pub fn on_backspace(&mut self) {
        if self.screen == Screen::Game && self.app.phase() == PhaseKind::Setup {
            self.input.pop();
        }
    }

    /// Delete: remove the highlighted player during setup.
    pub fn on_delete(&mut self) {
        if self.screen != Screen::Game || self.app.phase() != PhaseKind::Setup {
            return;
        }
        if let Some(id) = self.selected_player() {
            self.act(Action::RemovePlayer(id));
            if self.feedback.is_none() && self.renaming.is_some() {
                self.renaming = None;
                self.input.clear();
            }
        }
    }

    /// Tab: start renaming the highlighted player during setup.
    pub fn on_tab(&mut self) {
        if self.screen != Screen::Game || self.app.phase() != PhaseKind::Setup {
            return;
        }
        if let Some(player) = self.app.session().roster().players().get(self.selected) {
            self.input = player.name.clone();
            self.renaming = Some(player.id);
        }
    }

    pub fn on_enter(&mut self) {
        if self.screen != Screen::Game {
            return;
        }

        match self.app.phase() {
            PhaseKind::Setup => {
                if let Some(id) = self.renaming {
                    let name = self.input.clone();
                    self.act(Action::RenamePlayer(id, name));
                    if self.feedback.is_none() {
                        self.renaming = None;
                        self.input.clear();
                    }
                } else if self.input.trim().is_empty() {
                    self.act(Action::StartGame);
                } else {
                    let name = self.input.clone();
                    self.act(Action::AddPlayer(name));
                    if self.feedback.is_none() {
                        self.input.clear();
                        self.selected = self.app.session().roster().len().saturating_sub(1);
                    }
                }
            }
            PhaseKind::Reveal => {
                let showing = self.app.session().visible_card().is_some();
                self.act(if showing {
                    Action::AcknowledgeCard
                } else {
                    Action::ShowCard
                });
            }
            PhaseKind::Discuss => self.act(Action::NextSpeaker),
            PhaseKind::Vote => {
                let voter = self.app.session().next_voter().map(|p| p.id);
                if let (Some(voter), Some(suspect)) = (voter, self.selected_player()) {
                    self.act(Action::CastVote { voter, suspect });
                }
            }
            PhaseKind::Results => self.rematch(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::CategoryCatalog;
    use crate::game::roster::RosterLimits;
    use crate::storage::{HistoryStore, DEFAULT_HISTORY_LIMIT};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn coordinator(seed: u64) -> AppCoordinator {
        let store = HistoryStore::open_in_memory(DEFAULT_HISTORY_LIMIT).unwrap();
        AppCoordinator::new(App::with_rng(
            RosterLimits::default(),
            CategoryCatalog::builtin().clone(),
            Some(store),
            None,
            StdRng::seed_from_u64(seed),
        ))
    }

    fn type_name(c: &mut AppCoordinator, name: &str) {
        for ch in name.chars() {
            c.on_char(ch);
        }
        c.on_enter();
    }

    fn with_trio(seed: u64) -> AppCoordinator {
        let mut c = coordinator(seed);
        for name in ["Alice", "Bob", "Charlie"] {
            type_name(&mut c, name);
        }
        c
    }

    #[test]
    fn test_typing_adds_players() {
        let c = with_trio(1);
        assert_eq!(c.app.session().roster().names(), vec!["Alice", "Bob", "Charlie"]);
        assert!(c.input.is_empty());
        assert_eq!(c.selected, 2);
    }

    #[test]
    fn test_duplicate_name_shows_feedback() {
        let mut c = with_trio(1);
        type_name(&mut c, "alice");
        assert!(c.feedback.is_some());
        assert_eq!(c.input, "alice");
        assert_eq!(c.app.session().roster().len(), 3);
    }

    #[test]
    fn test_rename_with_tab() {
        let mut c = with_trio(1);
        c.on_up();
        c.on_tab();
        assert_eq!(c.input, "Bob");
        c.on_backspace();
        c.on_backspace();
        c.on_backspace();
        type_name(&mut c, "Dana");
        assert_eq!(c.app.session().roster().names(), vec!["Alice", "Dana", "Charlie"]);
        assert!(c.renaming.is_none());
    }

    #[test]
    fn test_delete_while_renaming_cancels_rename() {
        let mut c = with_trio(1);
        type_name(&mut c, "Dana");
        assert_eq!(c.selected, 3);
        c.on_tab();
        assert_eq!(c.renaming, Some(PlayerId(4)));

        c.on_delete();
        assert_eq!(c.app.session().roster().names(), vec!["Alice", "Bob", "Charlie"]);
        assert!(c.renaming.is_none());
        assert!(c.input.is_empty());

        type_name(&mut c, "Eve");
        assert!(c.feedback.is_none());
        assert_eq!(c.app.session().roster().len(), 4);
    }

    #[test]
    fn test_rejected_delete_keeps_rename() {
        let mut c = with_trio(1);
        c.on_tab();
        c.on_delete();
        assert_eq!(c.feedback.as_ref().unwrap().kind, Some(ErrorKind::Validation));
        assert_eq!(c.renaming, Some(PlayerId(3)));
        assert_eq!(c.input, "Charlie");
    }

    #[test]
    fn test_startup_warnings_do_not_block_play() {
        let mut c = coordinator(1);
        c.warn("could not load categories from words.txt");
        c.warn("History could not be opened; rounds will not be saved");
        let feedback = c.feedback.clone().unwrap();
        assert!(feedback.kind.is_none());
        assert!(feedback.message.contains("words.txt"));
        assert!(feedback.message.contains("History"));

        for name in ["Alice", "Bob", "Charlie"] {
            type_name(&mut c, name);
        }
        assert_eq!(c.screen, Screen::Game);
        assert_eq!(c.app.session().roster().len(), 3);
        c.on_enter();
        assert_eq!(c.app.phase(), PhaseKind::Reveal);
    }

    #[test]
    fn test_feedback_carries_error_kind() {
        let mut c = with_trio(1);
        c.on_enter();
        assert_eq!(c.app.phase(), PhaseKind::Reveal);
        c.act(Action::AddPlayer("Dana".into()));
        assert_eq!(c.feedback.as_ref().unwrap().kind, Some(ErrorKind::InvalidState));

        c.act(Action::ShowCard);
        assert!(c.feedback.is_none());
    }

    #[test]
    fn test_category_cycles_through_any() {
        let mut c = with_trio(1);
        let count = c.app.catalog().len();
        c.cycle_category(true);
        let first = c.app.catalog().list_categories()[0].to_string();
        assert_eq!(c.app.session().selected_category(), Some(first.as_str()));
        c.cycle_category(false);
        assert_eq!(c.app.session().selected_category(), None);
        c.cycle_category(false);
        let last = c.app.catalog().list_categories()[count - 1].to_string();
        assert_eq!(c.app.session().selected_category(), Some(last.as_str()));
    }

    #[test]
    fn test_enter_drives_a_full_round() {
        let mut c = with_trio(2);
        c.on_enter(); // start
        assert_eq!(c.app.phase(), PhaseKind::Reveal);
        while c.app.phase() == PhaseKind::Reveal {
            c.on_enter();
        }
        assert_eq!(c.app.phase(), PhaseKind::Discuss);

        c.on_char('v');
        assert_eq!(c.app.phase(), PhaseKind::Vote);
        // Everyone votes for the second player; Bob cannot vote for himself
        for _ in 0..3 {
            let voter = c.app.session().next_voter().unwrap().name.clone();
            c.selected = if voter == "Bob" { 0 } else { 1 };
            c.on_enter();
        }
        assert_eq!(c.app.phase(), PhaseKind::Results);
        let result = c.app.session().result().unwrap();
        assert_eq!(result.accused, Some(PlayerId(2)));
        assert_eq!(c.app.history().len(), 1);

        c.on_enter(); // rematch
        assert_eq!(c.app.phase(), PhaseKind::Reveal);
    }

    #[test]
    fn test_rejected_vote_keeps_feedback() {
        let mut c = with_trio(3);
        c.on_enter();
        while c.app.phase() == PhaseKind::Reveal {
            c.on_enter();
        }
        c.on_char('v');
        c.selected = 0; // Alice votes for herself
        c.on_enter();
        assert!(c.feedback.is_some());
        assert_eq!(c.app.phase(), PhaseKind::Vote);
    }

    #[test]
    fn test_history_screen_toggle() {
        let mut c = coordinator(1);
        c.toggle_history();
        assert_eq!(c.screen, Screen::History { scroll: 0 });
        c.on_down();
        assert_eq!(c.screen, Screen::History { scroll: 1 });
        c.on_escape();
        assert_eq!(c.screen, Screen::Game);
        assert!(!c.should_quit);
        c.on_escape();
        assert!(c.should_quit);
    }

    #[test]
    fn test_new_game_clears_roster() {
        let mut c = with_trio(4);
        c.on_enter();
        c.new_game();
        assert_eq!(c.app.phase(), PhaseKind::Setup);
        assert!(c.app.session().roster().is_empty());
    }
}
