//! Row mapping helpers for `SQLite` queries.

use chrono::{DateTime, NaiveDateTime, Utc};
use mlget_core::{CacheEntry, DownloadTask, RepositoryError, TaskStatus};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::path::PathBuf;

/// Format used for every timestamp column (fixed width so text ordering is
/// chronological).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Shared SELECT column list for task queries.
pub const TASK_SELECT_COLUMNS: &str =
    "id, url, out_path, total_bytes, downloaded_bytes, status, created_at, updated_at";

/// Shared SELECT column list for cache queries.
pub const CACHE_SELECT_COLUMNS: &str =
    "id, file_path, pkg_name, pkg_version, size, last_used_at";

/// Current time as stored in timestamp columns.
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Helper to parse datetime strings that may have "UTC" suffix.
pub fn parse_datetime(datetime_str: Option<String>) -> Option<DateTime<Utc>> {
    datetime_str.and_then(|s| {
        let trimmed = s.trim_end_matches(" UTC");
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
            .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
            .ok()
    })
}

/// Byte counters are `u64` in the domain and `INTEGER` in `SQLite`.
pub fn to_db_bytes(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_db_bytes(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn storage(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

/// Parse a `downloads` row.
pub fn row_to_task(row: &SqliteRow) -> Result<DownloadTask, RepositoryError> {
    let status_str: String = row.try_get("status").map_err(storage)?;
    let status = TaskStatus::parse(&status_str)
        .ok_or_else(|| RepositoryError::Storage(format!("Unknown task status '{status_str}'")))?;

    let created_at = parse_datetime(row.try_get("created_at").map_err(storage)?)
        .unwrap_or_else(Utc::now);
    let updated_at =
        parse_datetime(row.try_get("updated_at").map_err(storage)?).unwrap_or(created_at);

    Ok(DownloadTask {
        id: row.try_get("id").map_err(storage)?,
        url: row.try_get("url").map_err(storage)?,
        out_path: PathBuf::from(row.try_get::<String, _>("out_path").map_err(storage)?),
        total_bytes: from_db_bytes(row.try_get("total_bytes").map_err(storage)?),
        downloaded_bytes: from_db_bytes(row.try_get("downloaded_bytes").map_err(storage)?),
        status,
        created_at,
        updated_at,
    })
}

/// Parse a `cache` row.
pub fn row_to_cache_entry(row: &SqliteRow) -> Result<CacheEntry, RepositoryError> {
    Ok(CacheEntry {
        id: row.try_get("id").map_err(storage)?,
        file_path: PathBuf::from(row.try_get::<String, _>("file_path").map_err(storage)?),
        pkg_name: row.try_get("pkg_name").map_err(storage)?,
        pkg_version: row.try_get("pkg_version").map_err(storage)?,
        size: from_db_bytes(row.try_get("size").map_err(storage)?),
        last_used_at: parse_datetime(row.try_get("last_used_at").map_err(storage)?)
            .unwrap_or_else(Utc::now),
    })
}
