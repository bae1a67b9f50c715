//! IMPOSTER - pass-the-device party game
//!
//! Everyone gets the secret word except one. Give clues, find the impostor.

mod app;
mod config;
mod error;
mod game;
mod logging;
mod stats;
mod storage;
mod tui;

use app::{App, AppCoordinator};
use config::GameConfig;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use game::catalog::CategoryCatalog;
use std::error::Error;
use std::time::Duration;
use storage::HistoryStore;
use tracing::{info, warn};
use tui::Tui;

fn main() -> Result<(), Box<dyn Error>> {
    let config = GameConfig::load()?;

    // Logging is best effort; the game runs without it
    if let Ok(dir) = HistoryStore::data_dir() {
        logging::init(&dir);
    }
    info!(?config, "starting");

    // A bad categories file falls back to the built-in list
    let categories_file = config.categories_file.as_deref();
    let (catalog, catalog_error) = CategoryCatalog::load_or_builtin(categories_file);
    let catalog_warning = catalog_error.map(|e| {
        let path = categories_file.map(|p| p.display().to_string()).unwrap_or_default();
        warn!(%path, error = %e, "failed to load categories");
        format!("Using built-in categories; could not load {}: {}", path, e)
    });

    let history = match HistoryStore::open(config.history_limit) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %e, "history unavailable");
            None
        }
    };
    let history_error = history.is_none();

    let app = App::new(
        config.roster_limits(),
        catalog,
        history,
        config.default_category.clone(),
    );
    let mut coordinator = AppCoordinator::new(app);
    if let Some(message) = catalog_warning {
        coordinator.warn(message);
    }
    if history_error {
        coordinator.warn("History could not be opened; rounds will not be saved");
    }

    // Initialize terminal
    let mut terminal = Tui::new()?;
    terminal.enter()?;

    let poll_rate = Duration::from_millis(250);

    loop {
        // Render
        terminal.draw(|frame| tui::render(frame, &coordinator))?;

        // Poll for events with timeout
        if event::poll(poll_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            coordinator.quit();
                        }
                        KeyCode::Esc => coordinator.on_escape(),
                        KeyCode::Enter => coordinator.on_enter(),
                        KeyCode::Backspace => coordinator.on_backspace(),
                        KeyCode::Delete => coordinator.on_delete(),
                        KeyCode::Tab => coordinator.on_tab(),
                        KeyCode::Up => coordinator.on_up(),
                        KeyCode::Down => coordinator.on_down(),
                        KeyCode::Left => coordinator.cycle_category(false),
                        KeyCode::Right => coordinator.cycle_category(true),
                        KeyCode::F(2) => coordinator.toggle_history(),
                        KeyCode::F(5) => coordinator.new_game(),
                        KeyCode::Char(c) => coordinator.on_char(c),
                        _ => {}
                    }
                }
            }
        }

        // Check for quit
        if coordinator.should_quit {
            break;
        }
    }

    info!("exiting");
    // Terminal cleanup happens automatically via Tui::drop
    Ok(())
}
