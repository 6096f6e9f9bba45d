//! Transfer port shared by the accelerated and streaming strategies.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{TransferRequest, TransferResult, TransferStrategyKind};

/// Conditions that prevent a transfer from being attempted at all.
///
/// Expected failures (network errors, nonzero exit codes) are never
/// reported here; they are encoded in `TransferResult`.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The destination directory could not be prepared.
    #[error("Cannot prepare destination {path}: {reason}")]
    Destination { path: String, reason: String },

    /// The external process could not be started.
    #[error("Failed to start {program}: {reason}")]
    Spawn { program: String, reason: String },
}

/// Executes one fetch.
#[async_trait]
pub trait TransferPort: Send + Sync {
    /// Which strategy this port implements.
    fn kind(&self) -> TransferStrategyKind;

    /// External executable this strategy needs on the system path, if any.
    fn required_executable(&self) -> Option<&str> {
        None
    }

    /// Run the transfer to completion.
    async fn transfer(&self, request: TransferRequest) -> Result<TransferResult, TransferError>;
}
