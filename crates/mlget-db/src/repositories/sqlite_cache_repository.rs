//! `SQLite` implementation of the `CacheRepository` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;

use mlget_core::{CacheEntry, CacheInsert, CacheRepository, NewCacheEntry, RepositoryError};

use super::row_mappers::{CACHE_SELECT_COLUMNS, now_timestamp, row_to_cache_entry, to_db_bytes};

/// `SQLite` implementation of the `CacheRepository` trait.
///
/// Backs the `cache` table; `file_path` carries a UNIQUE constraint.
pub struct SqliteCacheRepository {
    pool: SqlitePool,
}

impl SqliteCacheRepository {
    /// Create a new `SQLite` cache repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheRepository for SqliteCacheRepository {
    async fn add(&self, entry: &NewCacheEntry) -> Result<CacheInsert, RepositoryError> {
        let size = tokio::fs::metadata(&entry.file_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO cache (file_path, pkg_name, pkg_version, size, last_used_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.file_path.to_string_lossy().as_ref())
        .bind(&entry.pkg_name)
        .bind(&entry.pkg_version)
        .bind(to_db_bytes(size))
        .bind(now_timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            tracing::debug!(path = %entry.file_path.display(), "Cache entry already present");
            return Ok(CacheInsert::AlreadyPresent);
        }
        Ok(CacheInsert::Inserted(result.last_insert_rowid()))
    }

    async fn list(&self) -> Result<Vec<CacheEntry>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CACHE_SELECT_COLUMNS} FROM cache ORDER BY last_used_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        rows.iter().map(row_to_cache_entry).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use tempfile::tempdir;

    async fn repo() -> SqliteCacheRepository {
        SqliteCacheRepository::new(setup_test_database().await.unwrap())
    }

    #[tokio::test]
    async fn insertion_is_idempotent_on_path() {
        let repo = repo().await;
        let temp = tempdir().unwrap();
        let file = temp.path().join("pkg.whl");
        std::fs::write(&file, b"0123456789").unwrap();

        let first = repo.add(&NewCacheEntry::new(&file)).await.unwrap();
        assert!(matches!(first, CacheInsert::Inserted(_)));

        let second = repo
            .add(&NewCacheEntry::new(&file).with_package("pkg", Some("2.0".into())))
            .await
            .unwrap();
        assert_eq!(second, CacheInsert::AlreadyPresent);

        let entries = repo.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        // The duplicate insert did not overwrite the first row.
        assert_eq!(entries[0].pkg_name, None);
        assert_eq!(entries[0].size, 10);
        assert_eq!(Some(entries[0].id), first.id());
    }

    #[tokio::test]
    async fn missing_file_is_recorded_with_zero_size() {
        let repo = repo().await;
        repo.add(&NewCacheEntry::new("/definitely/not/here.whl").with_package("x", None))
            .await
            .unwrap();

        let entries = repo.list().await.unwrap();
        assert_eq!(entries[0].size, 0);
        assert_eq!(entries[0].pkg_name.as_deref(), Some("x"));
        assert_eq!(entries[0].pkg_version, None);
    }

    #[tokio::test]
    async fn list_is_most_recently_used_first() {
        let repo = repo().await;
        repo.add(&NewCacheEntry::new("/a")).await.unwrap();
        repo.add(&NewCacheEntry::new("/b")).await.unwrap();

        let paths: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.file_path)
            .collect();
        assert_eq!(paths, vec![std::path::PathBuf::from("/b"), "/a".into()]);
    }
}
