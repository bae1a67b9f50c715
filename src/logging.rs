//! Structured logging to a file in the data directory
//!
//! The terminal belongs to the TUI, so log output goes to `imposter.log`
//! next to the history database. The level comes from `IMPOSTER_LOG`
//! (any `EnvFilter` directive), defaulting to `info`.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "IMPOSTER_LOG";

const LOG_FILE: &str = "imposter.log";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber writing to `dir/imposter.log`.
///
/// Returns the log path, or `None` if the file could not be opened (the
/// game then runs without logging).
pub fn init(dir: &Path) -> Option<PathBuf> {
    fs::create_dir_all(dir).ok()?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    fmt()
        .with_env_filter(filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .ok()?;

    Some(path)
}
