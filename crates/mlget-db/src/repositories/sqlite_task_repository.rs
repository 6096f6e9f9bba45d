//! `SQLite` implementation of the `TaskRepository` trait.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use mlget_core::{
    DownloadTask, NewTask, RepositoryError, TaskId, TaskRepository, TaskStatus, TaskUpdate,
};

use super::row_mappers::{TASK_SELECT_COLUMNS, now_timestamp, row_to_task, to_db_bytes};

/// `SQLite` implementation of the `TaskRepository` trait.
///
/// Backs the `downloads` table.
pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    /// Create a new `SQLite` task repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn create(&self, task: &NewTask) -> Result<TaskId, RepositoryError> {
        let now = now_timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO downloads (url, out_path, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&task.url)
        .bind(task.out_path.to_string_lossy().as_ref())
        .bind(task.status.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    async fn update(&self, id: TaskId, update: &TaskUpdate) -> Result<(), RepositoryError> {
        if update.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM downloads WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        let Some(current) = current else {
            return Err(RepositoryError::NotFound(format!("Download task {id}")));
        };
        let current = TaskStatus::parse(&current)
            .ok_or_else(|| RepositoryError::Storage(format!("Unknown task status '{current}'")))?;

        if let Some(next) = update.status
            && !current.can_transition_to(next)
        {
            return Err(RepositoryError::Constraint(format!(
                "Download task {id} is {current}; cannot change to {next}"
            )));
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE downloads SET updated_at = ");
        query.push_bind(now_timestamp());
        if let Some(status) = update.status {
            query.push(", status = ").push_bind(status.as_str());
        }
        if let Some(bytes) = update.downloaded_bytes {
            query.push(", downloaded_bytes = ").push_bind(to_db_bytes(bytes));
        }
        if let Some(bytes) = update.total_bytes {
            query.push(", total_bytes = ").push_bind(to_db_bytes(bytes));
        }
        query.push(" WHERE id = ").push_bind(id);

        query
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, id: TaskId) -> Result<DownloadTask, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {TASK_SELECT_COLUMNS} FROM downloads WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?
        .ok_or_else(|| RepositoryError::NotFound(format!("Download task {id}")))?;

        row_to_task(&row)
    }

    async fn list(&self) -> Result<Vec<DownloadTask>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_SELECT_COLUMNS} FROM downloads ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        rows.iter().map(row_to_task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use std::path::PathBuf;

    async fn repo() -> SqliteTaskRepository {
        SqliteTaskRepository::new(setup_test_database().await.unwrap())
    }

    #[tokio::test]
    async fn create_assigns_unique_ids_in_queued_state() {
        let repo = repo().await;
        let a = repo
            .create(&NewTask::queued("https://h/a.whl", "/cache/a.whl"))
            .await
            .unwrap();
        let b = repo
            .create(&NewTask::queued("https://h/b.whl", "/cache/b.whl"))
            .await
            .unwrap();
        assert_ne!(a, b);

        let task = repo.get(a).await.unwrap();
        assert_eq!(task.url, "https://h/a.whl");
        assert_eq!(task.out_path, PathBuf::from("/cache/a.whl"));
        assert_eq!(task.status, TaskStatus::Queued);
        assert_eq!(task.total_bytes, 0);
        assert_eq!(task.downloaded_bytes, 0);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[tokio::test]
    async fn create_honors_initial_status() {
        let repo = repo().await;
        let task =
            NewTask::queued("https://h/c.whl", "/cache/c.whl").with_status(TaskStatus::Failed);
        let id = repo.create(&task).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap().status, TaskStatus::Failed);
    }

    #[tokio::test]
    async fn update_applies_fields_and_refreshes_timestamp() {
        let repo = repo().await;
        let id = repo.create(&NewTask::queued("u", "/o")).await.unwrap();
        let before = repo.get(id).await.unwrap();

        repo.update(
            id,
            &TaskUpdate::status(TaskStatus::Completed)
                .with_downloaded_bytes(1024)
                .with_total_bytes(2048),
        )
        .await
        .unwrap();

        let after = repo.get(id).await.unwrap();
        assert_eq!(after.status, TaskStatus::Completed);
        assert_eq!(after.downloaded_bytes, 1024);
        assert_eq!(after.total_bytes, 2048);
        assert_eq!(after.out_path, before.out_path);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn byte_counters_update_without_status() {
        let repo = repo().await;
        let id = repo.create(&NewTask::queued("u", "/o")).await.unwrap();
        repo.update(id, &TaskUpdate::default().with_downloaded_bytes(10))
            .await
            .unwrap();
        let task = repo.get(id).await.unwrap();
        assert_eq!(task.downloaded_bytes, 10);
        assert_eq!(task.status, TaskStatus::Queued);
    }

    #[tokio::test]
    async fn empty_update_is_a_noop() {
        let repo = repo().await;
        let id = repo.create(&NewTask::queued("u", "/o")).await.unwrap();
        let before = repo.get(id).await.unwrap();
        repo.update(id, &TaskUpdate::default()).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let repo = repo().await;
        let err = repo
            .update(999, &TaskUpdate::status(TaskStatus::Failed))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn terminal_status_never_regresses() {
        let repo = repo().await;
        let id = repo.create(&NewTask::queued("u", "/o")).await.unwrap();
        repo.update(id, &TaskUpdate::status(TaskStatus::Failed))
            .await
            .unwrap();

        let err = repo
            .update(id, &TaskUpdate::status(TaskStatus::Queued))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Constraint(_)));

        let err = repo
            .update(id, &TaskUpdate::status(TaskStatus::Completed))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Constraint(_)));

        assert_eq!(repo.get(id).await.unwrap().status, TaskStatus::Failed);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let repo = repo().await;
        let first = repo.create(&NewTask::queued("a", "/a")).await.unwrap();
        let second = repo.create(&NewTask::queued("b", "/b")).await.unwrap();
        let third = repo.create(&NewTask::queued("c", "/c")).await.unwrap();

        let ids: Vec<TaskId> = repo.list().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let repo = repo().await;
        assert!(matches!(
            repo.get(42).await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
    }
}
