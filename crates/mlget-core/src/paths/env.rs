//! Snapshot of the process environment used for path resolution.
//!
//! Captured once at startup and passed down, so resolution stays a pure
//! function and tests never touch process-wide state.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Explicit base directory override.
pub const MLGET_HOME_VAR: &str = "MLGET_HOME";
/// Windows user profile directory.
pub const USERPROFILE_VAR: &str = "USERPROFILE";
/// Unix home directory.
pub const HOME_VAR: &str = "HOME";

const TRACKED_VARS: &[&str] = &[MLGET_HOME_VAR, USERPROFILE_VAR, HOME_VAR];

/// The subset of the environment mlget path resolution depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
    home_dir: Option<PathBuf>,
}

impl EnvSnapshot {
    /// Read the tracked variables and the platform home directory.
    #[must_use]
    pub fn capture() -> Self {
        let vars = TRACKED_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|v| ((*name).to_string(), v)))
            .collect();
        Self {
            vars,
            home_dir: dirs::home_dir(),
        }
    }

    /// Set a variable (builder style, for tests and embedding).
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Set the platform home directory fallback.
    #[must_use]
    pub fn with_home_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(path.into());
        self
    }

    /// Value of a variable; empty values count as unset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Platform home directory as reported by the OS.
    #[must_use]
    pub fn home_dir(&self) -> Option<&PathBuf> {
        self.home_dir.as_ref()
    }
}
