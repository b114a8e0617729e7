//! fileid: stable identifiers for filesystem paths
//!
//! Every tracked path gets an opaque 128-bit identifier that survives
//! renames and moves, so state attached to a file can follow it around.
//! - Path normalization (one fixed, platform-independent policy)
//! - SQLite-backed identifier <-> path table
//! - Recursive move/copy/delete over whole directory subtrees

pub mod config;
pub mod error;
pub mod id;
pub mod manager;
pub mod path;
pub mod storage;
pub mod subtree;

pub use config::FileIdConfig;
pub use error::{FileIdError, Result};
pub use id::FileId;
pub use manager::{CopyObserver, FileIdManager};
pub use path::{normalize, NormalizedPath};
pub use storage::FileRecord;
pub use subtree::CopiedRecord;
