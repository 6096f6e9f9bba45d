//! Platform probe implementation for mlget-runtime.
//!
//! This module provides the `DefaultPlatformProbe` which implements
//! `PlatformProbe` from mlget-core by touching the real process
//! environment: the system path, the GPU driver utility and environment
//! variables.

mod commands;

use std::path::PathBuf;

use mlget_core::PlatformProbe;
use mlget_core::domain::variant::GPU_DRIVER_UTILITY;

pub use commands::combined_output;

/// Default implementation of `PlatformProbe`.
///
/// Constructed in the CLI's bootstrap and shared with the resolver and
/// the install service.
///
/// # Example
///
/// ```ignore
/// use mlget_runtime::DefaultPlatformProbe;
/// use mlget_core::PlatformProbe;
///
/// let probe = DefaultPlatformProbe::new();
/// let aria2 = probe.find_executable("aria2c");
/// ```
pub struct DefaultPlatformProbe;

impl DefaultPlatformProbe {
    /// Create a new default platform probe.
    pub const fn new() -> Self {
        Self
    }
}

impl Default for DefaultPlatformProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformProbe for DefaultPlatformProbe {
    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        let found = which::which(name).ok();
        tracing::debug!(name, found = ?found, "Executable lookup");
        found
    }

    fn query_gpu_driver_output(&self) -> Option<String> {
        let utility = self.find_executable(GPU_DRIVER_UTILITY)?;
        combined_output(&utility, &[])
    }

    fn read_env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}
