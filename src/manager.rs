//! File identity manager
//!
//! Hands out stable identifiers for paths and keeps the identifier <-> path
//! table in step with renames, copies and deletes that some other layer has
//! already carried out on disk. Every public call normalizes its paths and
//! runs inside one transaction; an error anywhere rolls the whole call back.

use rusqlite::{Connection, TransactionBehavior};
use crate::config::FileIdConfig;
use crate::error::{FileIdError, Result};
use crate::id::FileId;
use crate::path::{normalize, NormalizedPath};
use crate::storage::{self, FileRecord, Repository};
use crate::subtree::{self, CopiedRecord};

/// Told about every record a successful `copy` created, so state keyed by
/// the source identifiers can be carried over to the new ones.
pub trait CopyObserver: Send {
    fn on_copy(&self, copied: &[CopiedRecord]);
}

impl<F> CopyObserver for F
where
    F: Fn(&[CopiedRecord]) + Send,
{
    fn on_copy(&self, copied: &[CopiedRecord]) {
        self(copied)
    }
}

pub struct FileIdManager {
    conn: Connection,
    copy_observer: Option<Box<dyn CopyObserver>>,
}

impl FileIdManager {
    /// Open (or create) the store named by `config` and ensure the schema.
    pub fn open(config: &FileIdConfig) -> Result<Self> {
        let conn = storage::open_database(&config.db_path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = storage::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        tracing::debug!("Creating File ID tables and indices");
        Repository::new(&conn).initialize()?;
        Ok(Self { conn, copy_observer: None })
    }

    pub fn set_copy_observer(&mut self, observer: impl CopyObserver + 'static) {
        self.copy_observer = Some(Box::new(observer));
    }

    /// Identifier for `path`, creating a record the first time it is seen.
    pub fn index(&mut self, path: &str) -> Result<FileId> {
        let path = normalize(path);
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let id = index_in(&Repository::new(&tx), &path)?;
        tx.commit()?;
        Ok(id)
    }

    /// `index` for a whole batch of paths, committed together.
    pub fn index_many<I>(&mut self, paths: I) -> Result<Vec<FileId>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let ids = {
            let repo = Repository::new(&tx);
            paths
                .into_iter()
                .map(|p| index_in(&repo, &normalize(p.as_ref())))
                .collect::<Result<Vec<_>>>()?
        };
        tx.commit()?;
        tracing::debug!("Indexed batch of {} paths", ids.len());
        Ok(ids)
    }

    /// Record `path` under `id` (or a fresh identifier). Unlike `index` this
    /// refuses a path that already has a record.
    pub fn insert(&mut self, path: &str, id: Option<FileId>) -> Result<FileId> {
        let path = normalize(path);
        let id = id.unwrap_or_default();
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Repository::new(&tx).insert(id, path.as_str())?;
        tx.commit()?;
        tracing::debug!("Inserted {} as {}", path, id);
        Ok(id)
    }

    /// `None` when the path has not been indexed.
    pub fn get_id(&self, path: &str) -> Result<Option<FileId>> {
        let path = normalize(path);
        Repository::new(&self.conn).get_id(path.as_str())
    }

    /// `None` when no record carries `id`.
    pub fn get_path(&self, id: FileId) -> Result<Option<String>> {
        Repository::new(&self.conn).get_path(id)
    }

    /// Point the record for `old_path` at `new_path`, keeping its identifier.
    /// With `recursive`, descendants of `old_path` follow it. An unindexed
    /// `old_path` gets `new_path` indexed instead. Returns the identifier now
    /// held by `new_path`.
    pub fn move_path(&mut self, old_path: &str, new_path: &str, recursive: bool) -> Result<FileId> {
        let old_path = normalize(old_path);
        let new_path = normalize(new_path);
        tracing::debug!("Moving file from {} to {} (recursive: {})", old_path, new_path, recursive);

        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let id = {
            let repo = Repository::new(&tx);
            if recursive {
                subtree::move_subtree(&repo, &old_path, &new_path)?;
            }
            match repo.get_id(old_path.as_str())? {
                Some(id) => {
                    repo.update_path(id, new_path.as_str())?;
                    id
                }
                None => index_in(&repo, &new_path)?,
            }
        };
        tx.commit()?;
        Ok(id)
    }

    /// Give `to_path` a brand-new identifier, indexing `from_path` along the
    /// way. With `recursive`, every descendant of `from_path` is mirrored
    /// under `to_path`, again with new identifiers. Returns the identifier
    /// of `to_path`.
    pub fn copy(&mut self, from_path: &str, to_path: &str, recursive: bool) -> Result<FileId> {
        let from_path = normalize(from_path);
        let to_path = normalize(to_path);
        tracing::debug!("Copying file from {} to {} (recursive: {})", from_path, to_path, recursive);

        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let (root, descendants) = {
            let repo = Repository::new(&tx);
            let descendants = if recursive {
                subtree::copy_subtree(&repo, &from_path, &to_path)?
            } else {
                Vec::new()
            };
            let source_id = index_in(&repo, &from_path)?;
            let id = FileId::new();
            repo.insert(id, to_path.as_str())?;
            (CopiedRecord { source_id, id, path: to_path.into_string() }, descendants)
        };
        tx.commit()?;

        let id = root.id;
        if let Some(observer) = &self.copy_observer {
            let mut copied = Vec::with_capacity(descendants.len() + 1);
            copied.push(root);
            copied.extend(descendants);
            observer.on_copy(&copied);
        }
        Ok(id)
    }

    /// Drop the record for `path` and, with `recursive`, all its
    /// descendants. Unindexed paths are a no-op.
    pub fn delete(&mut self, path: &str, recursive: bool) -> Result<()> {
        let path = normalize(path);
        tracing::debug!("Deleting file {} (recursive: {})", path, recursive);

        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let repo = Repository::new(&tx);
            if recursive {
                subtree::delete_subtree(&repo, &path)?;
            }
            repo.delete_path(path.as_str())?;
        }
        tx.commit()?;
        Ok(())
    }

    /// All records, ordered by path
    pub fn records(&self) -> Result<Vec<FileRecord>> {
        Repository::new(&self.conn).records()
    }

    pub fn count(&self) -> Result<u64> {
        Repository::new(&self.conn).count()
    }

    /// Commit anything still pending and close the store, reporting any
    /// failure to do so. Dropping the manager closes it silently.
    pub fn close(self) -> Result<()> {
        let Self { conn, .. } = self;
        if !conn.is_autocommit() {
            conn.execute_batch("COMMIT")?;
        }
        conn.close().map_err(|(_, e)| FileIdError::Database(e))?;
        tracing::info!("File ID store closed");
        Ok(())
    }
}

fn index_in(repo: &Repository<'_>, path: &NormalizedPath) -> Result<FileId> {
    if let Some(id) = repo.get_id(path.as_str())? {
        return Ok(id);
    }
    let id = FileId::new();
    repo.insert(id, path.as_str())?;
    tracing::debug!("Indexed {} as {}", path, id);
    Ok(id)
}
