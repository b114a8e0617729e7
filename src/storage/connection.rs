//! Database connection management
//!
//! Opens (creating if needed) the SQLite file behind the identifier table and
//! applies the connection pragmas. Schema creation lives in `Repository::initialize`.

use std::path::Path;
use rusqlite::Connection;
use crate::error::{FileIdError, Result};

/// Open the store file at `db_path`, creating its parent directory first.
pub fn open_database(db_path: &Path) -> Result<Connection> {
    let db_dir = db_path.parent()
        .ok_or_else(|| FileIdError::InvalidPath(format!("Invalid database path: {}", db_path.display())))?;

    std::fs::create_dir_all(db_dir)
        .map_err(FileIdError::Io)?;

    let conn = Connection::open(db_path)
        .map_err(FileIdError::Database)?;

    // WAL lets readers on other connections proceed while we write
    let mode: String = conn.pragma_update_and_check(None, "journal_mode", WAL, |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case(WAL) {
        tracing::warn!("journal_mode is {} (wanted {}) for {}", mode, WAL, db_path.display());
    }

    conn.pragma_update(None, "synchronous", NORMAL)?;

    tracing::info!("Database opened at: {}", db_path.display());
    Ok(conn)
}

/// Private in-memory store, gone once the connection closes.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    tracing::debug!("Opened in-memory database");
    Ok(conn)
}

// SQL pragma constants
const WAL: &str = "WAL";
const NORMAL: &str = "NORMAL";
