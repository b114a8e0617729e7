// FILE: src/storage/repository.rs
use rusqlite::{Connection, OptionalExtension, params};
use crate::error::{FileIdError, Result};
use crate::id::FileId;
use crate::storage::FileRecord;

/// Every statement against the `files` table.
///
/// Borrows a plain connection or an open `Transaction` (which derefs to one),
/// so the caller decides the transaction boundary.
pub struct Repository<'a> {
    conn: &'a Connection,
}

impl<'a> Repository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS files (
                id BLOB PRIMARY KEY,
                path TEXT NOT NULL UNIQUE
            );

            CREATE INDEX IF NOT EXISTS ix_files_path ON files (path);
        "#).map_err(FileIdError::Database)?;
        tracing::debug!("[Repository] Ensured files table and path index");
        Ok(())
    }

    pub fn get_id(&self, path: &str) -> Result<Option<FileId>> {
        let id = self.conn
            .query_row("SELECT id FROM files WHERE path = ?1", params![path], |row| row.get(0))
            .optional()?;
        Ok(id)
    }

    pub fn get_path(&self, id: FileId) -> Result<Option<String>> {
        let path = self.conn
            .query_row("SELECT path FROM files WHERE id = ?1", params![id], |row| row.get(0))
            .optional()?;
        Ok(path)
    }

    pub fn insert(&self, id: FileId, path: &str) -> Result<()> {
        self.conn
            .execute("INSERT INTO files (id, path) VALUES (?1, ?2)", params![id, path])
            .map_err(|e| FileIdError::from_write(e, path))?;
        Ok(())
    }

    /// Insert many pre-generated rows through one prepared statement.
    pub fn insert_batch(&self, rows: &[(FileId, String)]) -> Result<()> {
        let mut stmt = self.conn.prepare_cached("INSERT INTO files (id, path) VALUES (?1, ?2)")?;
        for (id, path) in rows {
            stmt.execute(params![id, path])
                .map_err(|e| FileIdError::from_write(e, path))?;
        }
        Ok(())
    }

    pub fn update_path(&self, id: FileId, new_path: &str) -> Result<usize> {
        let rows = self.conn
            .execute("UPDATE files SET path = ?1 WHERE id = ?2", params![new_path, id])
            .map_err(|e| FileIdError::from_write(e, new_path))?;
        Ok(rows)
    }

    pub fn delete_path(&self, path: &str) -> Result<usize> {
        let rows = self.conn.execute("DELETE FROM files WHERE path = ?1", params![path])?;
        Ok(rows)
    }

    /// Rows with `lower < path < upper`, ordered by path.
    pub fn records_in_range(&self, lower: &str, upper: &str) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, path FROM files WHERE path > ?1 AND path < ?2 ORDER BY path"
        )?;
        let rows = stmt.query_map(params![lower, upper], |row| {
            Ok(FileRecord { id: row.get(0)?, path: row.get(1)? })
        })?;
        let mut results = Vec::new();
        for r in rows { results.push(r?); }
        Ok(results)
    }

    /// For every path in `(lower, upper)`, drop the first `strip_chars`
    /// characters and put `new_prefix` in front. A path clash is reported
    /// with the rewritten path that is already taken.
    pub fn rewrite_range(&self, lower: &str, upper: &str, strip_chars: usize, new_prefix: &str) -> Result<usize> {
        let skip = strip_chars as i64 + 1;
        let result = self.conn.execute(
            "UPDATE files SET path = ?1 || substr(path, ?2) WHERE path > ?3 AND path < ?4",
            params![new_prefix, skip, lower, upper],
        );
        match result {
            Ok(rows) => Ok(rows),
            Err(e) => {
                // the failed statement was undone, so the clash is still visible
                let taken = self.first_taken_rewrite(lower, upper, skip, new_prefix)?
                    .unwrap_or_else(|| new_prefix.to_string());
                Err(FileIdError::from_write(e, &taken))
            }
        }
    }

    fn first_taken_rewrite(&self, lower: &str, upper: &str, skip: i64, new_prefix: &str) -> Result<Option<String>> {
        let taken = self.conn
            .query_row(
                "SELECT f.path FROM files f
                 JOIN (SELECT ?1 || substr(path, ?2) AS rewritten FROM files WHERE path > ?3 AND path < ?4) r
                   ON f.path = r.rewritten
                 ORDER BY f.path LIMIT 1",
                params![new_prefix, skip, lower, upper],
                |row| row.get(0),
            )
            .optional()?;
        Ok(taken)
    }

    pub fn delete_range(&self, lower: &str, upper: &str) -> Result<usize> {
        let rows = self.conn.execute(
            "DELETE FROM files WHERE path > ?1 AND path < ?2",
            params![lower, upper],
        )?;
        Ok(rows)
    }

    pub fn records(&self) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare("SELECT id, path FROM files ORDER BY path")?;
        let rows = stmt.query_map([], |row| {
            Ok(FileRecord { id: row.get(0)?, path: row.get(1)? })
        })?;
        let mut results = Vec::new();
        for r in rows { results.push(r?); }
        Ok(results)
    }

    pub fn count(&self) -> Result<u64> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        Repository::new(&conn).initialize().unwrap();
        conn
    }

    #[test]
    fn test_initialize_is_repeatable() {
        let conn = setup();
        let repo = Repository::new(&conn);
        repo.initialize().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_point_lookups() {
        let conn = setup();
        let repo = Repository::new(&conn);
        let id = FileId::new();
        repo.insert(id, "a/b.txt").unwrap();

        assert_eq!(repo.get_id("a/b.txt").unwrap(), Some(id));
        assert_eq!(repo.get_path(id).unwrap().as_deref(), Some("a/b.txt"));
        assert_eq!(repo.get_id("a/c.txt").unwrap(), None);
        assert_eq!(repo.get_path(FileId::new()).unwrap(), None);
    }

    #[test]
    fn test_duplicate_path_classified() {
        let conn = setup();
        let repo = Repository::new(&conn);
        repo.insert(FileId::new(), "x").unwrap();

        let err = repo.insert(FileId::new(), "x").unwrap_err();
        assert!(matches!(err, FileIdError::DuplicatePath(ref p) if p == "x"));
    }

    #[test]
    fn test_duplicate_id_is_store_error() {
        let conn = setup();
        let repo = Repository::new(&conn);
        let id = FileId::new();
        repo.insert(id, "x").unwrap();

        let err = repo.insert(id, "y").unwrap_err();
        assert!(matches!(err, FileIdError::Database(_)));
    }

    #[test]
    fn test_rewrite_range_counts_characters() {
        let conn = setup();
        let repo = Repository::new(&conn);
        let id = FileId::new();
        repo.insert(id, "ünï/dätä.txt").unwrap();

        let lower = "ünï/";
        let rows = repo.rewrite_range(lower, "ünï0", lower.chars().count(), "z/").unwrap();

        assert_eq!(rows, 1);
        assert_eq!(repo.get_path(id).unwrap().as_deref(), Some("z/dätä.txt"));
    }

    #[test]
    fn test_range_excludes_prefix_siblings() {
        let conn = setup();
        let repo = Repository::new(&conn);
        for p in ["a", "a/b", "a/b/c", "ab/c", "a.txt", "a0"] {
            repo.insert(FileId::new(), p).unwrap();
        }

        let paths: Vec<String> = repo.records_in_range("a/", "a0").unwrap()
            .into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["a/b", "a/b/c"]);

        assert_eq!(repo.delete_range("a/", "a0").unwrap(), 2);
        assert_eq!(repo.count().unwrap(), 4);
    }

    #[test]
    fn test_range_lower_bound_is_exclusive() {
        let conn = setup();
        let repo = Repository::new(&conn);
        for p in ["/", "/a", "/a/b"] {
            repo.insert(FileId::new(), p).unwrap();
        }

        let paths: Vec<String> = repo.records_in_range("/", "0").unwrap()
            .into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/a", "/a/b"]);

        assert_eq!(repo.rewrite_range("/", "0", 1, "/mnt/").unwrap(), 2);
        assert!(repo.get_id("/").unwrap().is_some());

        assert_eq!(repo.delete_range("/", "0").unwrap(), 2);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_rewrite_clash_names_taken_path() {
        let conn = setup();
        let repo = Repository::new(&conn);
        let moving = FileId::new();
        repo.insert(moving, "a/one").unwrap();
        repo.insert(FileId::new(), "a/two").unwrap();
        repo.insert(FileId::new(), "z/two").unwrap();

        let err = repo.rewrite_range("a/", "a0", 2, "z/").unwrap_err();

        assert!(matches!(err, FileIdError::DuplicatePath(ref p) if p == "z/two"));
        assert_eq!(repo.get_path(moving).unwrap().as_deref(), Some("a/one"));
    }
}
