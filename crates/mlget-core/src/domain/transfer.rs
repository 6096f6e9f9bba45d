//! Transfer request and result types shared by every transfer strategy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::source::{file_uri_path, is_file_url};

/// File name used when a URL has no usable last path segment.
pub const DEFAULT_FILE_NAME: &str = "downloaded.file";

/// Suffix of the in-progress file written next to the destination.
pub const PART_SUFFIX: &str = ".part";

/// Status code reported by the streaming strategy on any failure.
pub const STREAM_FAILURE_CODE: i32 = 2;

/// Default number of connections requested from the accelerator.
pub const DEFAULT_CONNECTIONS: u32 = 8;

/// Callback for transfer progress: (`downloaded_bytes`, `total_bytes` if known).
pub type ProgressCallback = Box<dyn Fn(u64, Option<u64>) + Send + Sync>;

/// Which strategy executed a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStrategyKind {
    /// External multi-connection accelerator.
    Accelerated,
    /// Single-stream fallback.
    Streaming,
}

impl fmt::Display for TransferStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accelerated => f.write_str("accelerated"),
            Self::Streaming => f.write_str("streaming"),
        }
    }
}

/// A single fetch to execute.
pub struct TransferRequest {
    /// Location to fetch (URL, or anything the strategy can interpret).
    pub url: String,
    /// Directory the artifact is written into.
    pub destination_dir: PathBuf,
    /// Connection count hint for the accelerator.
    pub connections: u32,
    /// Raw arguments spliced in right after the accelerator executable.
    pub extra_args: Vec<String>,
    /// Best-effort progress reporting (streaming strategy only).
    pub progress: Option<ProgressCallback>,
    /// Saved name; derived from `url` when `None`.
    pub file_name: Option<String>,
}

impl TransferRequest {
    pub fn new(url: impl Into<String>, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination_dir: destination_dir.into(),
            connections: DEFAULT_CONNECTIONS,
            extra_args: Vec::new(),
            progress: None,
            file_name: None,
        }
    }

    #[must_use]
    pub const fn with_connections(mut self, connections: u32) -> Self {
        self.connections = connections;
        self
    }

    #[must_use]
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// File name the artifact will be saved under.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| file_name_for(&self.url))
    }

    /// Final destination path on success.
    #[must_use]
    pub fn final_path(&self) -> PathBuf {
        self.destination_dir.join(self.file_name())
    }

    /// Partial-transfer marker path.
    #[must_use]
    pub fn part_path(&self) -> PathBuf {
        part_path_for(&self.final_path())
    }
}

impl fmt::Debug for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferRequest")
            .field("url", &self.url)
            .field("destination_dir", &self.destination_dir)
            .field("connections", &self.connections)
            .field("extra_args", &self.extra_args)
            .field("progress", &self.progress.is_some())
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// Uniform outcome of a transfer, whichever strategy ran.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub url: String,
    /// Final path on success. On failure, the partial artifact: the
    /// `.part` file for streaming; the accelerator keeps its partial data
    /// under the final name, so that path is reported.
    pub destination: PathBuf,
    /// 0 on success, nonzero on failure.
    pub status_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// A partial artifact was present (accelerator: before the run;
    /// streaming: after a failed run).
    pub resumable: bool,
    pub strategy: TransferStrategyKind,
}

impl TransferResult {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code == 0
    }

    /// Best diagnostic text for a failed transfer.
    #[must_use]
    pub fn diagnostic(&self) -> &str {
        if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        }
    }
}

/// Derive the saved file name from a URL or path: its last path segment,
/// or [`DEFAULT_FILE_NAME`] when there is none.
///
/// `file://` URIs name the local file they point at, percent-escapes
/// decoded. Other URLs keep the raw segment.
#[must_use]
pub fn file_name_for(location: &str) -> String {
    if is_file_url(location) {
        if let Some(name) = file_uri_path(location)
            .as_deref()
            .and_then(Path::file_name)
        {
            return name.to_string_lossy().into_owned();
        }
    }
    let without_query = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    let trimmed = without_query.trim_end_matches(['/', '\\']);
    let after_scheme = trimmed
        .split_once("://")
        .map_or(trimmed, |(_, rest)| rest);
    // A bare authority ("https://host") has no path segment to use.
    if trimmed.contains("://") && !after_scheme.contains('/') {
        return DEFAULT_FILE_NAME.to_string();
    }
    match after_scheme.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name.to_string(),
        _ => DEFAULT_FILE_NAME.to_string(),
    }
}

/// Partial-file path for a final destination (`<name>.part`).
#[must_use]
pub fn part_path_for(final_path: &Path) -> PathBuf {
    let mut name = final_path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(PART_SUFFIX);
    final_path.with_file_name(name)
}
