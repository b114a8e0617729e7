//! Error types for the file identity manager

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileIdError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Path already indexed: {0}")]
    DuplicatePath(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl FileIdError {
    /// Reclassifies a UNIQUE violation on `files.path` as `DuplicatePath`.
    /// Primary key collisions and every other failure pass through as-is.
    pub(crate) fn from_write(err: rusqlite::Error, path: &str) -> Self {
        if is_unique_violation(&err) {
            FileIdError::DuplicatePath(path.to_string())
        } else {
            FileIdError::Database(err)
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

pub type Result<T> = std::result::Result<T, FileIdError>;
