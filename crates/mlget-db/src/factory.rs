//! Composition utilities for building repositories with `SQLite` backends.
//!
//! This module is focused purely on construction and should not contain any
//! domain logic.

use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;

use mlget_core::Repos;

use crate::repositories::{SqliteCacheRepository, SqliteTaskRepository};
use crate::setup::setup_database;

/// Factory for creating State Store repositories.
pub struct StoreFactory;

impl StoreFactory {
    /// Open the store file at `db_path` and build both repositories.
    pub async fn open(db_path: &Path) -> anyhow::Result<Repos> {
        let pool = setup_database(db_path).await?;
        Ok(Self::build_repos(pool))
    }

    /// Build both repositories from a pool.
    ///
    /// Returns a `Repos` struct from `mlget-core` containing trait-object-wrapped
    /// repositories.
    pub fn build_repos(pool: SqlitePool) -> Repos {
        Repos::new(
            Arc::new(SqliteTaskRepository::new(pool.clone())),
            Arc::new(SqliteCacheRepository::new(pool)),
        )
    }
}

/// Test database helper for integration tests.
///
/// Provides an in-memory `SQLite` database with the production schema applied.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    /// Create a new in-memory test database with full schema.
    pub async fn new() -> anyhow::Result<Self> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self { pool })
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Trait-object repositories sharing this database.
    pub fn repos(&self) -> Repos {
        StoreFactory::build_repos(self.pool.clone())
    }

    /// Create a task repository using this test database.
    pub fn task_repository(&self) -> SqliteTaskRepository {
        SqliteTaskRepository::new(self.pool.clone())
    }

    /// Create a cache repository using this test database.
    pub fn cache_repository(&self) -> SqliteCacheRepository {
        SqliteCacheRepository::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlget_core::{NewCacheEntry, NewTask};
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_store_and_shares_it_between_repos() {
        let temp = tempdir().unwrap();
        let db_path = temp.path().join("db").join("mlget.db");

        let repos = StoreFactory::open(&db_path).await.unwrap();
        repos
            .tasks
            .create(&NewTask::queued("https://h/a.whl", "/c/a.whl"))
            .await
            .unwrap();
        repos.cache.add(&NewCacheEntry::new("/c/a.whl")).await.unwrap();

        // A second open sees the rows written by the first.
        let reopened = StoreFactory::open(&db_path).await.unwrap();
        assert_eq!(reopened.tasks.list().await.unwrap().len(), 1);
        assert_eq!(reopened.cache.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_db_repos_share_one_memory_database() {
        let db = TestDb::new().await.unwrap();
        db.repos()
            .tasks
            .create(&NewTask::queued("u", "/o"))
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM downloads")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
