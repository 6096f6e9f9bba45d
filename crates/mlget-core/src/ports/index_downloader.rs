//! Index-download helper port.

use async_trait::async_trait;
use std::path::PathBuf;

use super::ResolveError;

/// Fetches a binary package from an alternate package index into a scratch
/// directory, without dependency resolution.
#[async_trait]
pub trait IndexDownloader: Send + Sync {
    /// Download `spec` from `index_url` and return the local files
    /// collected from the scratch directory (possibly empty).
    ///
    /// A helper process that exits nonzero yields
    /// `ResolveError::IndexDownload`.
    async fn download(&self, spec: &str, index_url: &str) -> Result<Vec<PathBuf>, ResolveError>;
}
