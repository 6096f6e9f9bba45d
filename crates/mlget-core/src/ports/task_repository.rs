//! Download task repository port.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{DownloadTask, NewTask, TaskId, TaskUpdate};

/// Port for the persisted download-task table.
///
/// Each write is its own committed transaction.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Register a task and return its newly assigned id.
    async fn create(&self, task: &NewTask) -> Result<TaskId, RepositoryError>;

    /// Apply a partial update and refresh `updated_at`.
    ///
    /// An empty update is a no-op. Updating an unknown id returns
    /// `RepositoryError::NotFound`; moving a terminal status elsewhere
    /// returns `RepositoryError::Constraint`.
    async fn update(&self, id: TaskId, update: &TaskUpdate) -> Result<(), RepositoryError>;

    /// Fetch one task.
    async fn get(&self, id: TaskId) -> Result<DownloadTask, RepositoryError>;

    /// All tasks, most recently created first.
    async fn list(&self) -> Result<Vec<DownloadTask>, RepositoryError>;
}
