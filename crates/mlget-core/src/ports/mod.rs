//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - No process/filesystem implementation details
//! - Repository traits are minimal and CRUD-focused
//! - Environment probing goes through `PlatformProbe`, never ad hoc

pub mod cache_repository;
pub mod index_downloader;
pub mod platform_probe;
pub mod source_resolver;
pub mod task_repository;
pub mod transfer;

use std::sync::Arc;
use thiserror::Error;

use crate::paths::PathError;

pub use cache_repository::CacheRepository;
pub use index_downloader::IndexDownloader;
pub use platform_probe::PlatformProbe;
pub use source_resolver::{ResolveError, SourceResolver};
pub use task_repository::TaskRepository;
pub use transfer::{TransferError, TransferPort};

/// Container for the State Store trait objects.
///
/// Lives in `mlget-core` so services can accept it without depending on
/// `mlget-db`.
#[derive(Clone)]
pub struct Repos {
    /// Download task table.
    pub tasks: Arc<dyn TaskRepository>,
    /// Cache index table.
    pub cache: Arc<dyn CacheRepository>,
}

impl Repos {
    /// Create a new Repos container.
    pub fn new(tasks: Arc<dyn TaskRepository>, cache: Arc<dyn CacheRepository>) -> Self {
        Self { tasks, cache }
    }
}

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend error (database file cannot be opened or written).
    #[error("Storage error: {0}")]
    Storage(String),

    /// A constraint was violated (e.g., an illegal status transition).
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Core error type for semantic domain errors.
///
/// Adapters map this to their own error types (CLI exit codes, etc.).
#[derive(Debug, Error)]
pub enum CoreError {
    /// No candidate source could be determined.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// State Store operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A transfer could not even be attempted.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// A required directory could not be prepared.
    #[error(transparent)]
    Path(#[from] PathError),
}
