//! Platform probe port.
//!
//! Every read of process-wide state the resolver and orchestrator need
//! (PATH lookups, the GPU driver query, environment variables) goes through
//! this trait so tests can inject a fake instead of mutating the process.

use std::path::PathBuf;

/// Port for probing the host platform.
///
/// Implementations never fail: anything that cannot be determined is
/// reported as `None`.
pub trait PlatformProbe: Send + Sync {
    /// Locate an executable on the system path.
    fn find_executable(&self, name: &str) -> Option<PathBuf>;

    /// Run the GPU driver query utility and return its combined output.
    ///
    /// `None` when the utility is missing, cannot be run, or exits nonzero.
    fn query_gpu_driver_output(&self) -> Option<String>;

    /// Read an environment variable (`None` if unset or not unicode).
    fn read_env(&self, name: &str) -> Option<String>;
}
