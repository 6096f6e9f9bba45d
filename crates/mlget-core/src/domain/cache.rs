//! Cache index domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file known to be present in the local cache.
///
/// `file_path` is the unique key. Eviction is not implemented; `last_used_at`
/// exists so a maintenance pass can order entries by recency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub id: i64,
    pub file_path: PathBuf,
    pub pkg_name: Option<String>,
    pub pkg_version: Option<String>,
    /// Size on disk at insertion time, 0 if the file was absent.
    pub size: u64,
    pub last_used_at: DateTime<Utc>,
}

/// Data needed to register a cache entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCacheEntry {
    pub file_path: PathBuf,
    pub pkg_name: Option<String>,
    pub pkg_version: Option<String>,
}

impl NewCacheEntry {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            pkg_name: None,
            pkg_version: None,
        }
    }

    /// Attach package name and version metadata.
    #[must_use]
    pub fn with_package(mut self, name: impl Into<String>, version: Option<String>) -> Self {
        self.pkg_name = Some(name.into());
        self.pkg_version = version;
        self
    }
}

/// Result of inserting into the cache index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheInsert {
    /// A new row was written with this id.
    Inserted(i64),
    /// The path was already indexed; nothing changed.
    AlreadyPresent,
}

impl CacheInsert {
    /// Row id when a new row was written.
    #[must_use]
    pub const fn id(&self) -> Option<i64> {
        match self {
            Self::Inserted(id) => Some(*id),
            Self::AlreadyPresent => None,
        }
    }
}
