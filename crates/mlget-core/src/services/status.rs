//! Read-only listings straight from the State Store.

use crate::domain::{CacheEntry, DownloadTask};
use crate::ports::{CacheRepository, CoreError, TaskRepository};
use std::sync::Arc;

/// Thin facade over the task and cache repositories.
pub struct StatusService {
    tasks: Arc<dyn TaskRepository>,
    cache: Arc<dyn CacheRepository>,
}

impl StatusService {
    pub fn new(tasks: Arc<dyn TaskRepository>, cache: Arc<dyn CacheRepository>) -> Self {
        Self { tasks, cache }
    }

    /// All download tasks, newest first.
    pub async fn list_tasks(&self) -> Result<Vec<DownloadTask>, CoreError> {
        self.tasks.list().await.map_err(CoreError::from)
    }

    /// All cache entries, most recently used first.
    pub async fn list_cache_entries(&self) -> Result<Vec<CacheEntry>, CoreError> {
        self.cache.list().await.map_err(CoreError::from)
    }
}
