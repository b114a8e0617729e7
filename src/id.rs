//! File identifiers
//!
//! A `FileId` is a random (v4) UUID. It is stored as its 16 raw bytes and
//! printed in hyphenated form.

use std::fmt;
use std::str::FromStr;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::FileIdError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    /// Fresh random identifier. No store access involved, so callers can
    /// generate a whole batch before a bulk write.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for FileId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Accepts hyphenated or 32-digit simple hex.
impl FromStr for FileId {
    type Err = FileIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = matches!(s.len(), 32 | 36);
        if !well_formed {
            return Err(FileIdError::InvalidIdentifier(s.to_string()));
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| FileIdError::InvalidIdentifier(s.to_string()))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl ToSql for FileId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(&self.as_bytes()[..]))
    }
}

impl FromSql for FileId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let blob = value.as_blob()?;
        let bytes: [u8; 16] = blob
            .try_into()
            .map_err(|_| FromSqlError::InvalidBlobSize { expected_size: 16, blob_size: blob.len() })?;
        Ok(Self::from_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_ids_are_distinct() {
        let ids: HashSet<FileId> = (0..1000).map(|_| FileId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_parse_hyphenated_and_simple() {
        let id = FileId::new();
        let hyphenated: FileId = id.to_string().parse().unwrap();
        let simple: FileId = id.as_uuid().simple().to_string().parse().unwrap();
        assert_eq!(hyphenated, id);
        assert_eq!(simple, id);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "not-an-id", "1234", "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz", "{6ba7b810-9dad-11d1-80b4-00c04fd430c8}"] {
            let err = bad.parse::<FileId>().unwrap_err();
            assert!(matches!(err, FileIdError::InvalidIdentifier(_)), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_parse_rejects_surrounding_whitespace() {
        let id = FileId::new().to_string();
        for padded in [format!(" {}", id), format!("{} ", id), format!("\t{}\n", id)] {
            let err = padded.parse::<FileId>().unwrap_err();
            assert!(matches!(err, FileIdError::InvalidIdentifier(_)), "accepted {:?}", padded);
        }
    }

    #[test]
    fn test_sql_blob_round_trip() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let id = FileId::new();
        let (back, len): (FileId, i64) = conn
            .query_row("SELECT ?1, length(?1)", [id], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!(back, id);
        assert_eq!(len, 16);
    }
}
