//! Domain types for mlget.
//!
//! Pure data and pure functions: tasks, cache entries, transfer contracts,
//! resolved candidates and the hardware-variant table.

pub mod cache;
pub mod source;
pub mod task;
pub mod transfer;
pub mod variant;

pub use cache::{CacheEntry, CacheInsert, NewCacheEntry};
pub use source::{
    ARCHIVE_SUFFIXES, BINARY_PACKAGE_SUFFIXES, Candidate, URL_SCHEMES, file_uri, file_uri_path,
    has_archive_suffix, is_file_url, is_url,
};
pub use task::{DownloadTask, NewTask, TaskId, TaskStatus, TaskUpdate};
pub use transfer::{
    DEFAULT_CONNECTIONS, DEFAULT_FILE_NAME, PART_SUFFIX, ProgressCallback, STREAM_FAILURE_CODE,
    TransferRequest, TransferResult, TransferStrategyKind, file_name_for, part_path_for,
};
