//! Download task domain types.
//!
//! A task is one requested fetch: where it comes from, where it lands, and
//! how far it got. Tasks are persisted by the `TaskRepository` port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Identifier assigned by the store when a task is created.
pub type TaskId = i64;

/// Status of a download task.
///
/// Transitions are one-way: `Queued -> Completed | Failed`. Terminal states
/// never change again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Registered, transfer not yet finished.
    Queued,
    /// Transfer finished and the artifact is on disk.
    Completed,
    /// Transfer failed; a partial artifact may remain on disk.
    Failed,
}

impl TaskStatus {
    /// Convert to string representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether this status is final.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a task in this status may move to `next`.
    ///
    /// Terminal states only accept themselves (re-applying the same status is
    /// allowed so that byte-counter updates can carry the status along).
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        !self.is_terminal() || *self == next
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted download task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTask {
    pub id: TaskId,
    /// Source URL or path as handed to the transfer engine.
    pub url: String,
    /// Destination path, fixed at creation.
    pub out_path: PathBuf,
    /// Total size in bytes, 0 if unknown.
    pub total_bytes: u64,
    /// Bytes transferred so far, 0 if not tracked.
    pub downloaded_bytes: u64,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to register a new task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTask {
    pub url: String,
    pub out_path: PathBuf,
    pub status: TaskStatus,
}

impl NewTask {
    /// Create a new task registration in `Queued` status.
    pub fn queued(url: impl Into<String>, out_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            out_path: out_path.into(),
            status: TaskStatus::Queued,
        }
    }

    /// Override the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}

/// Partial update of the mutable fields of a task.
///
/// Only the fields that are `Some` are written. The store always refreshes
/// `updated_at` when at least one field is present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub downloaded_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
}

impl TaskUpdate {
    /// Update that only sets the status.
    #[must_use]
    pub const fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            downloaded_bytes: None,
            total_bytes: None,
        }
    }

    /// Set the downloaded byte counter.
    #[must_use]
    pub const fn with_downloaded_bytes(mut self, bytes: u64) -> Self {
        self.downloaded_bytes = Some(bytes);
        self
    }

    /// Set the total byte counter.
    #[must_use]
    pub const fn with_total_bytes(mut self, bytes: u64) -> Self {
        self.total_bytes = Some(bytes);
        self
    }

    /// True when no field would be written.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.downloaded_bytes.is_none() && self.total_bytes.is_none()
    }
}
