//! Source resolver port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Candidate;

/// Errors that prevent producing any candidate for a spec.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The package spec matches none of the resolution rules.
    #[error(
        "Could not resolve '{spec}' automatically. Please provide a direct URL to the package or a local path."
    )]
    Unresolvable { spec: String },

    /// Variant resolution ran but produced no usable file.
    #[error(
        "Could not download a matching build of '{spec}'. Please provide a direct URL or local path."
    )]
    NoCandidates { spec: String },

    /// The index-download helper failed.
    #[error("Failed to download '{spec}' from {index_url}: {message}")]
    IndexDownload {
        spec: String,
        index_url: String,
        message: String,
    },

    /// Filesystem error while preparing or reading the scratch directory.
    #[error("I/O error during resolution: {0}")]
    Io(String),
}

/// Turns a package spec into ordered candidate fetch locations.
#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Resolve `spec`. A successful result is never empty.
    async fn resolve(&self, spec: &str) -> Result<Vec<Candidate>, ResolveError>;
}
