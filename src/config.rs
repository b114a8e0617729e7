//! Construction-time configuration.
//!
//! The store location is always handed to `FileIdManager::open` explicitly.
//! `FileIdConfig::default()` only supplies the conventional per-user location.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::error::Result;

/// File name of the store inside the data directory
pub const DB_FILE_NAME: &str = "file_id_manager.db";

const APP_DIR: &str = "fileid";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileIdConfig {
    /// Location of the SQLite file backing the identifier table
    pub db_path: PathBuf,
}

impl Default for FileIdConfig {
    fn default() -> Self {
        Self { db_path: default_db_path() }
    }
}

impl FileIdConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self { db_path: db_path.into() }
    }

    /// Load a JSON config document. Keys that are absent keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: FileIdConfig = serde_json::from_str(&raw)?;
        tracing::debug!("Loaded config from {}: db_path={}", path.as_ref().display(), config.db_path.display());
        Ok(config)
    }
}

/// `<data dir>/fileid/file_id_manager.db`, or the working directory when the
/// platform reports no data dir.
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_fixed_file_name() {
        let config = FileIdConfig::default();
        assert_eq!(config.db_path.file_name().and_then(|n| n.to_str()), Some(DB_FILE_NAME));
    }

    #[test]
    fn test_from_file_reads_db_path() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_path = dir.path().join("fileid.json");
        std::fs::write(&cfg_path, r#"{ "db_path": "/srv/ids/files.db" }"#).unwrap();

        let config = FileIdConfig::from_file(&cfg_path).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/srv/ids/files.db"));
    }

    #[test]
    fn test_from_file_missing_key_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_path = dir.path().join("fileid.json");
        std::fs::write(&cfg_path, "{}").unwrap();

        let config = FileIdConfig::from_file(&cfg_path).unwrap();
        assert_eq!(config, FileIdConfig::default());
    }

    #[test]
    fn test_from_file_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_path = dir.path().join("fileid.json");
        std::fs::write(&cfg_path, "db_path = nope").unwrap();

        let err = FileIdConfig::from_file(&cfg_path).unwrap_err();
        assert!(matches!(err, crate::FileIdError::Config(_)));
    }
}
