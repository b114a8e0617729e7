//! Subtree rewriting for recursive move, copy and delete.
//!
//! The descendants of `p` are exactly the paths starting with `p/`. Because
//! that prefix ends in `/` (0x2F) and `0` (0x30) is the next code point, the
//! same set is the range `("p/", "p0")` under SQLite's binary collation.
//! Both ends are exclusive: `p/` itself is never a normalized path, and for
//! the root `/` the exclusive lower end keeps `/` out of its own subtree. The
//! range is served by the path index and needs no wildcard escaping, and
//! `px/...` never falls inside. The relative root `.` has an empty range.
//!
//! None of these functions commit; the caller owns the transaction.

use crate::error::Result;
use crate::id::FileId;
use crate::path::{normalize, NormalizedPath, SEPARATOR};
use crate::storage::Repository;

/// Open path range holding every descendant of one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtree {
    lower: String,
    upper: String,
}

impl Subtree {
    pub fn under(root: &NormalizedPath) -> Self {
        let lower = root.child_prefix();
        if lower.is_empty() {
            return Self { lower, upper: String::new() };
        }
        let mut upper = lower.clone();
        upper.pop();
        upper.push(char::from(SEPARATOR as u8 + 1));
        Self { lower, upper }
    }

    /// `root/`, the prefix shared by all descendants. Empty for `.`.
    pub fn prefix(&self) -> &str {
        &self.lower
    }

    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        !self.is_empty() && path.len() > self.lower.len() && path.starts_with(&self.lower)
    }

    /// Swap this subtree's prefix on `path` for `target`'s, normalizing the
    /// result.
    pub fn rebase(&self, path: &str, target: &Subtree) -> Option<String> {
        if !self.contains(path) {
            return None;
        }
        path.strip_prefix(&self.lower)
            .map(|suffix| normalize(&format!("{}{}", target.lower, suffix)).into_string())
    }
}

/// A descendant created by [`copy_subtree`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedRecord {
    pub source_id: FileId,
    pub id: FileId,
    pub path: String,
}

/// Repoint every descendant of `from` under `to`. Identifiers are kept.
pub fn move_subtree(repo: &Repository<'_>, from: &NormalizedPath, to: &NormalizedPath) -> Result<usize> {
    let source = Subtree::under(from);
    let target = Subtree::under(to);
    if source.is_empty() {
        return Ok(0);
    }

    // `../..`-style roots have descendants like `../../x` whose leading `..`
    // must be resolved against the new prefix, which plain SQL can't do.
    let rows = if from.is_parent_only() {
        let records = repo.records_in_range(&source.lower, &source.upper)?;
        for record in &records {
            if let Some(path) = source.rebase(&record.path, &target) {
                repo.update_path(record.id, &path)?;
            }
        }
        records.len()
    } else {
        repo.rewrite_range(
            &source.lower,
            &source.upper,
            source.lower.chars().count(),
            target.prefix(),
        )?
    };
    tracing::debug!("Moved {} descendants of {} under {}", rows, from, to);
    Ok(rows)
}

/// Create a fresh record under `to` for every descendant of `from`.
/// Identifiers are generated up front and written in one batch.
pub fn copy_subtree(repo: &Repository<'_>, from: &NormalizedPath, to: &NormalizedPath) -> Result<Vec<CopiedRecord>> {
    let source = Subtree::under(from);
    let target = Subtree::under(to);
    if source.is_empty() {
        return Ok(Vec::new());
    }

    let copies: Vec<CopiedRecord> = repo
        .records_in_range(&source.lower, &source.upper)?
        .into_iter()
        .filter_map(|record| {
            source.rebase(&record.path, &target).map(|path| CopiedRecord {
                source_id: record.id,
                id: FileId::new(),
                path,
            })
        })
        .collect();

    let rows: Vec<(FileId, String)> = copies.iter().map(|c| (c.id, c.path.clone())).collect();
    repo.insert_batch(&rows)?;

    tracing::debug!("Copied {} descendants of {} under {}", copies.len(), from, to);
    Ok(copies)
}

/// Drop every descendant of `root`. `root` itself is left alone.
pub fn delete_subtree(repo: &Repository<'_>, root: &NormalizedPath) -> Result<usize> {
    let subtree = Subtree::under(root);
    if subtree.is_empty() {
        return Ok(0);
    }
    let rows = repo.delete_range(&subtree.lower, &subtree.upper)?;
    tracing::debug!("Deleted {} descendants of {}", rows, root);
    Ok(rows)
}
