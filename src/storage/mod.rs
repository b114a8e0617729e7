// FILE: src/storage/mod.rs
pub mod connection;
pub mod repository;

// Common exports
pub use repository::Repository;
pub use connection::{open_database, open_in_memory};

use serde::Serialize;
use crate::id::FileId;

// Data Types
/// One identifier <-> path association in the `files` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub id: FileId,
    pub path: String,
}

impl std::fmt::Display for FileRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.id, self.path)
    }
}
