//! Game session state machine
//!
//! A session moves through five phases:
//!
//! ```text
//! Setup -> Reveal -> Discuss -> Vote -> Results
//!                       |                  ^
//!                       +--- skip/accuse --+
//! Results -> Setup (play again, roster kept)
//! any     -> Setup (new game, empty roster)
//! ```
//!
//! [`Session::apply`] never mutates the session it is called on. It
//! returns a new session (plus the history record of a round that just
//! finished) or a [`GameError`] describing why the action was refused.

use super::catalog::CategoryCatalog;
use super::order::SpeakingOrder;
use super::roles::{assign_roles, Card, RoleAssignment};
use super::roster::{Roster, RosterLimits};
use super::vote::{Ballots, Outcome};
use super::{Player, PlayerId};
use crate::error::GameError;
use crate::storage::HistoryRecord;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

/// How-to-play text shown on demand during discussion.
pub const RULES: &[&str] = &[
    "Everyone except the impostor knows the secret word.",
    "Take turns giving one-word clues about the word, in speaking order.",
    "Be specific enough to prove you know it, vague enough not to give it away.",
    "The impostor bluffs and tries to work out the word from the clues.",
    "When you're ready, vote on who you think the impostor is.",
];

/// The phase a session is in, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Setup,
    Reveal,
    Discuss,
    Vote,
    Results,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseKind::Setup => "setup",
            PhaseKind::Reveal => "reveal",
            PhaseKind::Discuss => "discussion",
            PhaseKind::Vote => "vote",
            PhaseKind::Results => "results",
        };
        f.write_str(name)
    }
}

/// A user action against the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddPlayer(String),
    RemovePlayer(PlayerId),
    RenamePlayer(PlayerId, String),
    /// Choose the category for the next round (`None` = any category)
    SelectCategory(Option<String>),
    StartGame,
    /// Show the current player's card
    ShowCard,
    /// Hide the card and pass the device on
    AcknowledgeCard,
    NextSpeaker,
    ShowRules,
    HideRules,
    StartVoting,
    SkipVoting,
    /// The group names a suspect without a formal vote
    Accuse(PlayerId),
    CastVote { voter: PlayerId, suspect: PlayerId },
    /// Back to setup with the same roster
    PlayAgain,
    /// Start over with an empty roster
    NewGame,
}

impl Action {
    fn describe(&self) -> &'static str {
        match self {
            Action::AddPlayer(_) => "add a player",
            Action::RemovePlayer(_) => "remove a player",
            Action::RenamePlayer(..) => "rename a player",
            Action::SelectCategory(_) => "change category",
            Action::StartGame => "start the game",
            Action::ShowCard => "show a card",
            Action::AcknowledgeCard => "pass the device on",
            Action::NextSpeaker => "move to the next speaker",
            Action::ShowRules => "show the rules",
            Action::HideRules => "hide the rules",
            Action::StartVoting => "start voting",
            Action::SkipVoting => "skip voting",
            Action::Accuse(_) => "accuse a player",
            Action::CastVote { .. } => "cast a vote",
            Action::PlayAgain => "play again",
            Action::NewGame => "start a new game",
        }
    }
}

/// Per-round data fixed when the game starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub id: Uuid,
    pub category: Option<String>,
    pub roles: RoleAssignment,
    pub started_at: DateTime<Utc>,
}

impl Round {
    pub fn word(&self) -> &str {
        self.roles.word()
    }

    pub fn impostor(&self) -> PlayerId {
        self.roles.impostor()
    }
}

/// Progress through the pass-the-device reveal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealProgress {
    /// Players who have seen their card, in order
    pub revealed: Vec<PlayerId>,
    /// Whether the current player's card is face up
    pub showing: bool,
}

/// Discussion state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discussion {
    pub order: SpeakingOrder,
    pub rules_visible: bool,
}

/// Formal vote state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteState {
    pub order: SpeakingOrder,
    pub ballots: Ballots,
}

/// How the round ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    pub outcome: Outcome,
    /// Player the group accused, if any
    pub accused: Option<PlayerId>,
    pub order: SpeakingOrder,
    /// Formal ballots (empty when the vote was skipped or decided by the group)
    pub ballots: Ballots,
    /// One-line explanation of the outcome
    pub reason: String,
}

/// The current phase with its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Reveal(RevealProgress),
    Discuss(Discussion),
    Vote(VoteState),
    Results(RoundResult),
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Setup => PhaseKind::Setup,
            Phase::Reveal(_) => PhaseKind::Reveal,
            Phase::Discuss(_) => PhaseKind::Discuss,
            Phase::Vote(_) => PhaseKind::Vote,
            Phase::Results(_) => PhaseKind::Results,
        }
    }
}

/// Result of a successful transition.
#[derive(Debug, Clone)]
pub struct Step {
    pub session: Session,
    /// Summary of a round that finished with this transition
    pub completed: Option<HistoryRecord>,
}

/// One pass-the-device game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    roster: Roster,
    category: Option<String>,
    round: Option<Round>,
    phase: Phase,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RosterLimits::default())
    }
}

impl Session {
    /// A new session in setup with an empty roster.
    pub fn new(limits: RosterLimits) -> Self {
        Self {
            roster: Roster::new(limits),
            category: None,
            round: None,
            phase: Phase::Setup,
        }
    }

    /// A new session in setup with a prepared roster.
    pub fn with_roster(roster: Roster, category: Option<String>) -> Self {
        Self {
            roster,
            category,
            round: None,
            phase: Phase::Setup,
        }
    }

    /// Apply an action, producing the next session.
    ///
    /// `self` is left untouched whether or not the action is accepted.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        action: Action,
        catalog: &CategoryCatalog,
        rng: &mut R,
    ) -> Result<Step, GameError> {
        let phase = self.phase.kind();
        let label = action.describe();
        let mut next = self.clone();
        let mut completed = None;

        match (&mut next.phase, &action) {
            (_, Action::NewGame) => {
                next = Session::new(self.roster.limits());
            }

            (Phase::Setup, Action::AddPlayer(name)) => {
                next.roster.add(name)?;
            }
            (Phase::Setup, Action::RemovePlayer(id)) => {
                next.roster.remove(*id)?;
            }
            (Phase::Setup, Action::RenamePlayer(id, name)) => {
                next.roster.rename(*id, name)?;
            }
            (Phase::Setup, Action::SelectCategory(category)) => {
                if let Some(name) = category {
                    let found = catalog
                        .get(name)
                        .ok_or_else(|| GameError::UnknownCategory(name.clone()))?;
                    next.category = Some(found.name.clone());
                } else {
                    next.category = None;
                }
            }
            (Phase::Setup, Action::StartGame) => {
                next.roster.check_playable()?;
                let pick = catalog.pick_word(next.category.as_deref(), rng)?;
                let roles = assign_roles(next.roster.players(), &pick.word, rng)?;
                next.round = Some(Round {
                    id: Uuid::new_v4(),
                    category: pick.category,
                    roles,
                    started_at: Utc::now(),
                });
                next.phase = Phase::Reveal(RevealProgress::default());
                info!(
                    players = next.roster.len(),
                    category = next.category.as_deref().unwrap_or("any"),
                    "round started"
                );
            }

            (Phase::Reveal(progress), Action::ShowCard) => {
                if progress.showing {
                    return Err(invalid(label, phase));
                }
                progress.showing = true;
            }
            (Phase::Reveal(progress), Action::AcknowledgeCard) => {
                if !progress.showing {
                    return Err(invalid(label, phase));
                }
                let current = self
                    .roster
                    .players()
                    .get(progress.revealed.len())
                    .map(|p| p.id)
                    .ok_or_else(|| invalid(label, phase))?;
                progress.revealed.push(current);
                progress.showing = false;

                if progress.revealed.len() == self.roster.len() {
                    let order = SpeakingOrder::generate(self.roster.players(), rng);
                    next.phase = Phase::Discuss(Discussion {
                        order,
                        rules_visible: false,
                    });
                    info!("all cards revealed, discussion started");
                }
            }

            (Phase::Discuss(discussion), Action::NextSpeaker) => {
                if discussion.order.is_complete() {
                    return Err(invalid(label, phase));
                }
                discussion.order.advance();
            }
            (Phase::Discuss(discussion), Action::ShowRules) => {
                discussion.rules_visible = true;
            }
            (Phase::Discuss(discussion), Action::HideRules) => {
                discussion.rules_visible = false;
            }
            (Phase::Discuss(discussion), Action::StartVoting) => {
                next.phase = Phase::Vote(VoteState {
                    order: discussion.order.clone(),
                    ballots: Ballots::new(),
                });
                info!("voting started");
            }
            (Phase::Discuss(discussion), Action::SkipVoting) => {
                let order = discussion.order.clone();
                let reason = format!("Voting skipped. {}", self.impostor_reveal());
                next.phase = Phase::Results(RoundResult {
                    outcome: Outcome::Skipped,
                    accused: None,
                    order,
                    ballots: Ballots::new(),
                    reason,
                });
                completed = Some(next.finish());
            }
            (Phase::Discuss(discussion), Action::Accuse(suspect)) => {
                if !self.roster.contains(*suspect) {
                    return Err(GameError::UnknownPlayer(*suspect));
                }
                let order = discussion.order.clone();
                next.phase = self.verdict(Some(*suspect), order, Ballots::new());
                completed = Some(next.finish());
            }

            (Phase::Vote(vote), Action::CastVote { voter, suspect }) => {
                vote.ballots.cast(self.roster.players(), *voter, *suspect)?;
                if vote.ballots.is_complete(self.roster.players()) {
                    let accused = vote.ballots.most_voted(self.roster.players());
                    let (order, ballots) = (vote.order.clone(), vote.ballots.clone());
                    next.phase = self.verdict(accused, order, ballots);
                    completed = Some(next.finish());
                }
            }

            (Phase::Results(_), Action::PlayAgain) => {
                next = Session::with_roster(self.roster.clone(), self.category.clone());
            }

            (_, _) => return Err(invalid(label, phase)),
        }

        debug!(action = label, from = %phase, to = %next.phase.kind(), "action applied");
        Ok(Step {
            session: next,
            completed,
        })
    }

    pub fn phase_kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Category chosen for the next round (`None` = any).
    pub fn selected_category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The current round, once the game has started.
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Player whose turn it is to look at their card.
    pub fn current_revealer(&self) -> Option<&Player> {
        match &self.phase {
            Phase::Reveal(progress) => self.roster.players().get(progress.revealed.len()),
            _ => None,
        }
    }

    /// The face-up card of the current revealer, if it is showing.
    pub fn visible_card(&self) -> Option<&Card> {
        match &self.phase {
            Phase::Reveal(progress) if progress.showing => {
                let player = self.current_revealer()?;
                self.round.as_ref()?.roles.card_for(player.id)
            }
            _ => None,
        }
    }

    /// Speaking order while discussing, voting or reviewing results.
    pub fn speaking_order(&self) -> Option<&SpeakingOrder> {
        match &self.phase {
            Phase::Discuss(d) => Some(&d.order),
            Phase::Vote(v) => Some(&v.order),
            Phase::Results(r) => Some(&r.order),
            _ => None,
        }
    }

    pub fn first_speaker(&self) -> Option<&Player> {
        let id = self.speaking_order()?.first_speaker()?;
        self.roster.get(id)
    }

    pub fn current_speaker(&self) -> Option<&Player> {
        match &self.phase {
            Phase::Discuss(d) => self.roster.get(d.order.current_speaker()?),
            _ => None,
        }
    }

    /// Rules text, when the rules panel is open.
    pub fn rules_text(&self) -> Option<&'static [&'static str]> {
        match &self.phase {
            Phase::Discuss(d) if d.rules_visible => Some(RULES),
            _ => None,
        }
    }

    /// Next player due to cast a ballot.
    pub fn next_voter(&self) -> Option<&Player> {
        match &self.phase {
            Phase::Vote(v) => self.roster.get(v.ballots.next_voter(self.roster.players())?),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&RoundResult> {
        match &self.phase {
            Phase::Results(r) => Some(r),
            _ => None,
        }
    }

    fn impostor_name(&self) -> String {
        self.round
            .as_ref()
            .and_then(|r| self.roster.name_of(r.impostor()))
            .unwrap_or("Unknown")
            .to_string()
    }

    fn impostor_reveal(&self) -> String {
        let word = self.round.as_ref().map(|r| r.word()).unwrap_or_default();
        format!(
            "{} was the impostor. The word was \"{}\".",
            self.impostor_name(),
            word
        )
    }

    /// Results phase for an accusation (or a tied vote).
    fn verdict(&self, accused: Option<PlayerId>, order: SpeakingOrder, ballots: Ballots) -> Phase {
        let impostor = self.round.as_ref().map(|r| r.impostor());
        let outcome = match impostor {
            Some(impostor) => Outcome::judge(accused, impostor),
            None => Outcome::ImpostorEscaped,
        };
        let word = self.round.as_ref().map(|r| r.word()).unwrap_or_default();

        let reason = match (outcome, accused.and_then(|id| self.roster.name_of(id))) {
            (Outcome::ImpostorCaught, _) => {
                format!("{} was caught! The word was \"{}\".", self.impostor_name(), word)
            }
            (_, Some(name)) => format!(
                "{} was wrongly accused! {} was the impostor.",
                name,
                self.impostor_name()
            ),
            (_, None) => "Vote was tied - impostor escapes!".to_string(),
        };

        Phase::Results(RoundResult {
            outcome,
            accused,
            order,
            ballots,
            reason,
        })
    }

    /// Snapshot of a round that has just reached Results.
    fn finish(&self) -> HistoryRecord {
        let result = self.result();
        let outcome = result.map(|r| r.outcome).unwrap_or(Outcome::Skipped);
        let accused = result
            .and_then(|r| r.accused)
            .and_then(|id| self.roster.name_of(id))
            .map(str::to_string);
        let record = HistoryRecord {
            id: self.round.as_ref().map(|r| r.id).unwrap_or_else(Uuid::new_v4),
            category: self.round.as_ref().and_then(|r| r.category.clone()),
            word: self
                .round
                .as_ref()
                .map(|r| r.word().to_string())
                .unwrap_or_default(),
            players: self.roster.names(),
            impostor: self.impostor_name(),
            accused,
            outcome,
            recorded_at: self
                .round
                .as_ref()
                .map(|r| r.started_at)
                .unwrap_or_else(Utc::now),
        };
        info!(outcome = outcome.label(), word = %record.word, "round finished");
        record
    }
}

fn invalid(action: &'static str, phase: PhaseKind) -> GameError {
    GameError::InvalidState { action, phase }
}
