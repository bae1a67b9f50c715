//! Persistent round history using SQLite (rusqlite)
//!
//! This module provides:
//! - OS-standard data directory location (via `directories` crate)
//! - SQLite database with schema versioning
//! - An append-only log of finished rounds, stored as JSON payloads

use crate::game::vote::Outcome;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Current schema version. Bump this when making schema changes.
/// Version history:
/// - v1: meta and history tables
const SCHEMA_VERSION: u32 = 1;

/// Default number of rounds kept in the log
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Could not determine data directory
    #[error("could not determine data directory")]
    NoDataDirectory,

    /// Schema version mismatch (future version)
    #[error("database schema version {found} is newer than supported version {supported}")]
    FutureSchemaVersion { found: u32, supported: u32 },

    /// Failed to create data directory
    #[error("failed to create data directory: {0}")]
    CreateDirFailed(std::io::Error),
}

/// Summary of one finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    /// `None` when the word was drawn from every category
    pub category: Option<String>,
    pub word: String,
    pub players: Vec<String>,
    pub impostor: String,
    /// Who the group accused, if anyone
    pub accused: Option<String>,
    pub outcome: Outcome,
    pub recorded_at: DateTime<Utc>,
}

/// The round history log.
pub struct HistoryStore {
    conn: Connection,
    limit: usize,
}

impl HistoryStore {
    /// Open or create the history database in the OS data directory.
    ///
    /// - Linux: `$XDG_DATA_HOME/imposter/` or `~/.local/share/imposter/`
    /// - macOS: `~/Library/Application Support/imposter/`
    pub fn open(limit: usize) -> Result<Self, StorageError> {
        let data_dir = Self::data_dir()?;
        std::fs::create_dir_all(&data_dir).map_err(StorageError::CreateDirFailed)?;
        Self::open_at(&data_dir.join("imposter.db"), limit)
    }

    /// Open or create a history database at a specific path.
    pub fn open_at(path: &Path, limit: usize) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, limit)
    }

    /// Open an in-memory database (for testing).
    #[cfg(test)]
    pub fn open_in_memory(limit: usize) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?, limit)
    }

    fn with_connection(conn: Connection, limit: usize) -> Result<Self, StorageError> {
        let store = HistoryStore {
            conn,
            limit: limit.max(1),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Get the OS-standard data directory.
    pub fn data_dir() -> Result<PathBuf, StorageError> {
        ProjectDirs::from("", "", "imposter")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(StorageError::NoDataDirectory)
    }

    /// Append a finished round, trimming the log to the configured limit.
    pub fn append(&self, record: &HistoryRecord) -> Result<(), StorageError> {
        let payload = serde_json::to_string(record)?;

        self.conn.execute(
            "INSERT OR REPLACE INTO history (id, recorded_at, payload) VALUES (?1, ?2, ?3)",
            params![
                record.id.to_string(),
                record.recorded_at.timestamp_millis(),
                payload
            ],
        )?;

        let trimmed = self.conn.execute(
            "DELETE FROM history WHERE rowid NOT IN (
                SELECT rowid FROM history ORDER BY rowid DESC LIMIT ?1
            )",
            params![self.limit as i64],
        )?;
        if trimmed > 0 {
            debug!(trimmed, "trimmed old history records");
        }

        Ok(())
    }

    /// All records, most recently appended first.
    ///
    /// Order follows insertion, not `recorded_at`, so a clock change never
    /// reorders or trims the wrong round. Rows that no longer decode are skipped.
    pub fn list(&self) -> Result<Vec<HistoryRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, payload FROM history ORDER BY rowid DESC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, payload) = row?;
            match serde_json::from_str::<HistoryRecord>(&payload) {
                Ok(record) => records.push(record),
                Err(e) => warn!(%id, error = %e, "skipping unreadable history record"),
            }
        }
        Ok(records)
    }

    /// Delete every record.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM history", [])?;
        Ok(())
    }

    /// Drop the history table so later writes fail (for testing).
    #[cfg(test)]
    pub fn break_history_table(&self) -> Result<(), StorageError> {
        self.conn.execute_batch("DROP TABLE history")?;
        Ok(())
    }

    // Private helper methods

    fn initialize_schema(&self) -> Result<(), StorageError> {
        let current_version = self.get_schema_version()?;

        if current_version == 0 {
            self.create_schema_v1()?;
        } else if current_version > SCHEMA_VERSION {
            // Database is from a newer build
            return Err(StorageError::FutureSchemaVersion {
                found: current_version,
                supported: SCHEMA_VERSION,
            });
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Result<u32, StorageError> {
        let table_exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='meta'",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        let version: u32 = self
            .conn
            .query_row("SELECT schema_version FROM meta LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        Ok(version)
    }

    fn create_schema_v1(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                schema_version INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            -- One row per finished round; payload is the JSON record
            CREATE TABLE IF NOT EXISTS history (
                id TEXT PRIMARY KEY,
                recorded_at INTEGER NOT NULL,
                payload TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_recorded ON history (recorded_at);
            "#,
        )?;

        self.conn.execute(
            "INSERT INTO meta (schema_version, created_at) VALUES (?1, ?2)",
            params![SCHEMA_VERSION, Utc::now().timestamp_millis()],
        )?;

        Ok(())
    }
}
