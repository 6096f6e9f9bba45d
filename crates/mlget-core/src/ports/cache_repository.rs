//! Cache index repository port.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{CacheEntry, CacheInsert, NewCacheEntry};

/// Port for the persisted cache index.
#[async_trait]
pub trait CacheRepository: Send + Sync {
    /// Index a file. Idempotent on `file_path`: a second insert of the same
    /// path returns `CacheInsert::AlreadyPresent` and writes nothing.
    ///
    /// The size is read from the filesystem at insertion time (0 if absent).
    async fn add(&self, entry: &NewCacheEntry) -> Result<CacheInsert, RepositoryError>;

    /// All entries, most recently used first.
    async fn list(&self) -> Result<Vec<CacheEntry>, RepositoryError>;
}
