//! UI rendering using ratatui
//!
//! Supports multiple screens:
//! - Game: one view per session phase (setup, reveal, discussion, vote, results)
//! - History: past rounds with aggregate stats

use crate::app::{App, AppCoordinator, Feedback, Screen};
use crate::error::ErrorKind;
use crate::game::catalog::CategoryCatalog;
use crate::game::session::{PhaseKind, Session};
use crate::game::vote::Outcome;
use crate::stats::HistoryStats;
use crate::storage::HistoryRecord;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

/// Render the appropriate screen based on app state
pub fn render(frame: &mut Frame, coordinator: &AppCoordinator) {
    match &coordinator.screen {
        Screen::Game => render_game(frame, coordinator),
        Screen::History { scroll } => render_history(frame, &coordinator.app, *scroll),
    }
}

/// Render the in-game screen for the current phase
fn render_game(frame: &mut Frame, coordinator: &AppCoordinator) {
    let area = frame.area();
    let session = coordinator.app.session();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Phase content
            Constraint::Length(1), // Feedback
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(frame, layout[0], session, coordinator.app.catalog());

    match session.phase_kind() {
        PhaseKind::Setup => render_setup(frame, layout[1], coordinator),
        PhaseKind::Reveal => render_reveal(frame, layout[1], session),
        PhaseKind::Discuss => render_discussion(frame, layout[1], session, coordinator.selected),
        PhaseKind::Vote => render_vote(frame, layout[1], session, coordinator.selected),
        PhaseKind::Results => render_results(frame, layout[1], session),
    }

    let (message, color) = match (&coordinator.feedback, coordinator.app.notice()) {
        (Some(feedback), _) => (feedback.message.as_str(), feedback_color(feedback)),
        (None, Some(notice)) => (notice, Color::Yellow),
        (None, None) => ("", Color::White),
    };
    let feedback = Paragraph::new(message)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center);
    frame.render_widget(feedback, layout[2]);

    let footer = Paragraph::new(footer_hint(session.phase_kind(), coordinator.renaming.is_some()))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[3]);
}

fn footer_hint(phase: PhaseKind, renaming: bool) -> &'static str {
    match phase {
        PhaseKind::Setup if renaming => "Enter Save name  Esc Cancel",
        PhaseKind::Setup => {
            "Type+Enter Add  Enter Start  ↑↓ Select  Tab Rename  Del Remove  ←→ Category  F2 History  Esc Quit"
        }
        PhaseKind::Reveal => "Enter/Space Show or hide card  F5 New game  Esc Quit",
        PhaseKind::Discuss => {
            "n Next speaker  r Rules  v Vote  s Skip vote  ↑↓+a Accuse  F5 New game  Esc Quit"
        }
        PhaseKind::Vote => "↑↓ Choose suspect  Enter Cast vote  F5 New game  Esc Quit",
        PhaseKind::Results => "Enter/r Play again  s Back to setup  F5 New game  F2 History  Esc Quit",
    }
}

/// Status line color: rejected input in red, wrong-phase keys dimmed,
/// problems that do not stop play in yellow.
fn feedback_color(feedback: &Feedback) -> Color {
    match feedback.kind {
        Some(ErrorKind::Validation) => Color::Red,
        Some(ErrorKind::NotFound) => Color::LightRed,
        Some(ErrorKind::InvalidState) => Color::DarkGray,
        None => Color::Yellow,
    }
}

/// Render the header: logo and current phase
fn render_header(frame: &mut Frame, area: Rect, session: &Session, catalog: &CategoryCatalog) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12), // Logo
            Constraint::Min(0),     // Category
            Constraint::Length(14), // Phase
        ])
        .split(inner);

    let logo = Paragraph::new("IMPOSTER")
        .style(Style::default().fg(Color::Red).bold())
        .alignment(Alignment::Left);
    frame.render_widget(logo, header_layout[0]);

    let category = match session.round() {
        Some(round) => round.category.clone(),
        None => session.selected_category().map(str::to_string),
    };
    let label = category.as_deref().unwrap_or("any");
    let category = if session.phase_kind() == PhaseKind::Setup {
        format!("Category: {}  ({} available)", label, catalog.len())
    } else {
        format!("Category: {}", label)
    };
    let category = Paragraph::new(category)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);
    frame.render_widget(category, header_layout[1]);

    let phase = Paragraph::new(session.phase_kind().to_string().to_uppercase())
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Right);
    frame.render_widget(phase, header_layout[2]);
}

/// Render the setup screen: roster, name input, start hint
fn render_setup(frame: &mut Frame, area: Rect, coordinator: &AppCoordinator) {
    let roster = coordinator.app.session().roster();
    let limits = roster.limits();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Name input
            Constraint::Min(4),    // Player list
            Constraint::Length(1), // Start status
        ])
        .split(area);

    let title = if coordinator.renaming.is_some() {
        " Rename player "
    } else if roster.is_full() {
        " Roster full "
    } else {
        " Add player "
    };
    let input = Paragraph::new(format!("> {}_", coordinator.input))
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(input, layout[0]);

    let items: Vec<ListItem> = if roster.is_empty() {
        vec![ListItem::new("  Type a name and press Enter")
            .style(Style::default().fg(Color::DarkGray))]
    } else {
        roster
            .players()
            .iter()
            .enumerate()
            .map(|(i, player)| {
                let style = if i == coordinator.selected {
                    Style::default().fg(Color::Yellow).bold()
                } else {
                    Style::default().fg(Color::White)
                };
                let prefix = if i == coordinator.selected { "> " } else { "  " };
                ListItem::new(format!("{}{}. {}", prefix, i + 1, player.name)).style(style)
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Players ({}/{}) ", roster.len(), limits.max)),
    );
    frame.render_widget(list, layout[1]);

    let (status, style) = if roster.len() >= limits.min {
        (
            "[ Press ENTER with an empty name to START ]".to_string(),
            Style::default().fg(Color::Green).bold(),
        )
    } else {
        (
            format!("Need at least {} players", limits.min),
            Style::default().fg(Color::DarkGray),
        )
    };
    let status = Paragraph::new(status)
        .style(style)
        .alignment(Alignment::Center);
    frame.render_widget(status, layout[2]);
}

/// Render the pass-the-device card reveal
fn render_reveal(frame: &mut Frame, area: Rect, session: &Session) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(2), // Whose turn
            Constraint::Length(5), // Card
            Constraint::Length(2), // Instructions
            Constraint::Percentage(25),
        ])
        .margin(2)
        .split(area);

    let name = session
        .current_revealer()
        .map(|p| p.name.as_str())
        .unwrap_or_default();
    let turn = Paragraph::new(format!("{}'s card", name))
        .style(Style::default().fg(Color::Cyan).bold())
        .alignment(Alignment::Center);
    frame.render_widget(turn, layout[1]);

    let (text, style, hint) = match session.visible_card() {
        Some(card) if card.is_impostor() => (
            card.label().to_string(),
            Style::default().fg(Color::Red).bold(),
            "You are the impostor! Blend in. Press Enter to hide and pass on.",
        ),
        Some(card) => (
            card.label().to_uppercase(),
            Style::default().fg(Color::Green).bold(),
            "Remember the word. Press Enter to hide and pass on.",
        ),
        None => (
            "?".to_string(),
            Style::default().fg(Color::DarkGray),
            "Make sure only you can see the screen, then press Enter.",
        ),
    };

    let card = Paragraph::new(format!("\n{}", text))
        .style(style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(card, layout[2]);

    let hint = Paragraph::new(hint)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, layout[3]);
}

/// Render the discussion: speaking order, optional rules panel
fn render_discussion(frame: &mut Frame, area: Rect, session: &Session, selected: usize) {
    let rules = session.rules_text();
    let constraints = if rules.is_some() {
        vec![Constraint::Percentage(50), Constraint::Percentage(50)]
    } else {
        vec![Constraint::Percentage(100)]
    };
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // First to speak
            Constraint::Length(2), // Current speaker
            Constraint::Min(4),    // Order
        ])
        .split(columns[0]);

    let first = session
        .first_speaker()
        .map(|p| p.name.as_str())
        .unwrap_or_default();
    let first = Paragraph::new(format!("First to speak: {}", first))
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Center);
    frame.render_widget(first, layout[0]);

    let current = match session.current_speaker() {
        Some(player) => format!("Now speaking: {}", player.name),
        None => "Everyone has spoken. Vote or skip!".to_string(),
    };
    let current = Paragraph::new(current)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);
    frame.render_widget(current, layout[1]);

    let order = session.speaking_order();
    let position = order.map(|o| o.position()).unwrap_or_default();
    let roster = session.roster();
    let items: Vec<ListItem> = order
        .map(|o| o.ids())
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter_map(|(i, id)| {
            let name = roster.name_of(*id)?;
            let marker = if i < position {
                "✓"
            } else if i == position {
                "▶"
            } else {
                " "
            };
            let highlighted = roster.players().get(selected).map(|p| p.id) == Some(*id);
            let style = if highlighted {
                Style::default().fg(Color::Yellow).bold()
            } else if i < position {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            Some(ListItem::new(format!(" {} {}. {}", marker, i + 1, name)).style(style))
        })
        .collect();
    let title = match order {
        Some(order) if !order.is_empty() => format!(" Speaking order ({}) ", order.len()),
        _ => " Speaking order ".to_string(),
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, layout[2]);

    if let Some(rules) = rules {
        let text = rules
            .iter()
            .map(|line| format!("• {}", line))
            .collect::<Vec<_>>()
            .join("\n\n");
        let panel = Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" How to play "));
        frame.render_widget(panel, columns[1]);
    }
}

/// Render the formal vote
fn render_vote(frame: &mut Frame, area: Rect, session: &Session, selected: usize) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Voter
            Constraint::Min(4),    // Suspects
        ])
        .split(area);

    let voter = session.next_voter();
    let prompt = match voter {
        Some(player) => format!("{}, who is the impostor?", player.name),
        None => "Counting votes...".to_string(),
    };
    let prompt = Paragraph::new(prompt)
        .style(Style::default().fg(Color::Cyan).bold())
        .alignment(Alignment::Center);
    frame.render_widget(prompt, layout[0]);

    let items: Vec<ListItem> = session
        .roster()
        .players()
        .iter()
        .enumerate()
        .map(|(i, player)| {
            let is_voter = voter.map(|v| v.id) == Some(player.id);
            let style = if is_voter {
                Style::default().fg(Color::DarkGray)
            } else if i == selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };
            let prefix = if i == selected { "> " } else { "  " };
            let suffix = if is_voter { " (you)" } else { "" };
            ListItem::new(format!("{}{}{}", prefix, player.name, suffix)).style(style)
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Suspects "));
    frame.render_widget(list, layout[1]);
}

/// Render the round results
fn render_results(frame: &mut Frame, area: Rect, session: &Session) {
    let Some(result) = session.result() else {
        return;
    };
    let round = session.round();
    let roster = session.roster();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Outcome
            Constraint::Length(2), // Reason
            Constraint::Length(1), // Word
            Constraint::Length(1), // Impostor
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Tally
        ])
        .split(area);

    let title = Paragraph::new(result.outcome.label().to_uppercase())
        .style(Style::default().fg(outcome_color(result.outcome)).bold())
        .alignment(Alignment::Center);
    frame.render_widget(title, layout[0]);

    let reason = Paragraph::new(result.reason.as_str())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(reason, layout[1]);

    let word = Paragraph::new(format!(
        "The word was: {}",
        round.map(|r| r.word()).unwrap_or_default()
    ))
    .style(Style::default().fg(Color::Green))
    .alignment(Alignment::Center);
    frame.render_widget(word, layout[2]);

    let impostor = round
        .and_then(|r| roster.name_of(r.impostor()))
        .unwrap_or_default();
    let impostor = Paragraph::new(format!("The impostor was: {}", impostor))
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center);
    frame.render_widget(impostor, layout[3]);

    if !result.ballots.is_empty() {
        let items: Vec<ListItem> = result
            .ballots
            .tally(roster.players())
            .into_iter()
            .filter(|count| count.votes > 0)
            .filter_map(|count| {
                let name = roster.name_of(count.player)?;
                let plural = if count.votes == 1 { "" } else { "s" };
                Some(ListItem::new(format!("  {} - {} vote{}", name, count.votes, plural)))
            })
            .collect();
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Votes "));
        frame.render_widget(list, layout[5]);
    }
}

fn outcome_color(outcome: Outcome) -> Color {
    match outcome {
        Outcome::ImpostorCaught => Color::Green,
        Outcome::ImpostorEscaped => Color::Red,
        Outcome::Skipped => Color::Yellow,
    }
}

/// Render the history screen
fn render_history(frame: &mut Frame, app: &App, scroll: usize) {
    let area = frame.area();
    let records = app.history();
    let stats = app.stats();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Stats
            Constraint::Min(4),    // Records
            Constraint::Length(1), // Footer
        ])
        .margin(1)
        .split(area);

    let header = Paragraph::new("History")
        .style(Style::default().fg(Color::Cyan).bold())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, layout[0]);

    let stats_widget = Paragraph::new(format_stats(&stats))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);
    frame.render_widget(stats_widget, layout[1]);

    if !app.has_history() {
        let missing = Paragraph::new("History is unavailable (storage could not be opened)")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(missing, layout[2]);
    } else if records.is_empty() {
        let empty = Paragraph::new("No games played yet")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, layout[2]);
    } else {
        let items: Vec<ListItem> = records
            .iter()
            .skip(scroll.min(records.len().saturating_sub(1)))
            .map(|record| {
                ListItem::new(format_record(record))
                    .style(Style::default().fg(outcome_color(record.outcome)))
            })
            .collect();
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Rounds ({}) ", records.len())),
        );
        frame.render_widget(list, layout[2]);
    }

    let footer = Paragraph::new("↑↓ Scroll  c Clear history  Esc/F2 Back")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[3]);
}

/// One history line: time, outcome, word, impostor
fn format_record(record: &HistoryRecord) -> String {
    let when = record
        .recorded_at
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M");
    let accused = match &record.accused {
        Some(name) if *name != record.impostor => format!(", {} accused", name),
        _ => String::new(),
    };
    format!(
        "{}  {:<16}  {} ({})  impostor: {}{}",
        when,
        record.outcome.label(),
        record.word,
        record.category.as_deref().unwrap_or("any"),
        record.impostor,
        accused
    )
}

/// Summary line for the stats panel
fn format_stats(stats: &HistoryStats) -> String {
    let rate = stats
        .crew_win_rate()
        .map(|r| format!("{}%", r))
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "Games: {}  Caught: {}  Escaped: {}  Skipped: {}  Crew win rate: {}",
        stats.total_games, stats.crew_wins, stats.impostor_wins, stats.skipped, rate
    );
    if let Some((name, count)) = &stats.most_frequent_impostor {
        line.push_str(&format!("\nMost often impostor: {} ({})", name, count));
    }
    line
}
