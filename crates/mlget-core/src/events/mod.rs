//! Install progress notifications.
//!
//! The orchestrator never writes to the terminal. Adapters subscribe with an
//! [`InstallObserver`] and render these events however they like.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::{Candidate, TaskId, TransferStrategyKind};

/// Callback receiving install events.
pub type InstallObserver = Arc<dyn Fn(&InstallEvent) + Send + Sync>;

/// Something noteworthy happened during an install.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstallEvent {
    /// The package spec resolved to these candidates, tried in order.
    Resolved { candidates: Vec<Candidate> },

    /// A task row was created for an attempt.
    TaskRegistered { task_id: TaskId, out_path: PathBuf },

    /// A transfer strategy was chosen for an attempt.
    ///
    /// `accelerator_missing` is set when the accelerated strategy was
    /// wanted but its executable is not on the path.
    StrategySelected {
        task_id: TaskId,
        strategy: TransferStrategyKind,
        accelerator_missing: bool,
    },

    /// Best-effort byte progress (streaming strategy only).
    Progress {
        task_id: TaskId,
        downloaded: u64,
        total: Option<u64>,
    },

    /// An attempt failed; the next candidate (if any) is tried.
    AttemptFailed {
        task_id: TaskId,
        status_code: i32,
        diagnostic: String,
    },
}
