//! Path normalization
//!
//! Every path is stored and compared in one canonical form, independent of
//! the host platform:
//! - `/` and `\` are both separators; the output only uses `/`
//! - empty and `.` segments are dropped, `..` pops the previous segment
//! - `..` above an absolute root is discarded, above a relative one it is kept
//! - the whole path is lowercased
//! - no trailing separator; the empty path becomes `.`

use std::fmt;

pub const SEPARATOR: char = '/';

const ROOT: &str = "/";
const CURRENT: &str = ".";
const PARENT: &str = "..";

/// A path that has been through [`normalize`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath(String);

impl NormalizedPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT
    }

    pub fn is_current(&self) -> bool {
        self.0 == CURRENT
    }

    /// Made of `..` segments only, so its descendants keep leading `..`
    /// segments that a new prefix can cancel out.
    pub fn is_parent_only(&self) -> bool {
        self.0.split(SEPARATOR).all(|segment| segment == PARENT)
    }

    /// What goes in front of a descendant's relative name: the path plus one
    /// separator, just the separator for the root, and nothing for `.`.
    pub fn child_prefix(&self) -> String {
        if self.is_root() {
            ROOT.to_string()
        } else if self.is_current() {
            String::new()
        } else {
            format!("{}{}", self.0, SEPARATOR)
        }
    }
}

impl AsRef<str> for NormalizedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Canonicalize `path`. Pure string work, never touches the filesystem.
pub fn normalize(path: &str) -> NormalizedPath {
    let lowered = path.to_lowercase();
    let absolute = lowered.starts_with(is_separator);

    let mut segments: Vec<&str> = Vec::new();
    for segment in lowered.split(is_separator) {
        match segment {
            "" | CURRENT => {}
            PARENT => {
                let parent = segments.last().copied();
                match parent {
                    Some(last) if last != PARENT => {
                        segments.pop();
                    }
                    _ if absolute => {}
                    _ => segments.push(PARENT),
                }
            }
            name => segments.push(name),
        }
    }

    let joined = segments.join(ROOT);
    let normalized = if absolute {
        format!("{}{}", ROOT, joined)
    } else if joined.is_empty() {
        CURRENT.to_string()
    } else {
        joined
    };

    NormalizedPath(normalized)
}
