//! Resolved mlget directory layout.

use std::fmt;
use std::path::{Path, PathBuf};

use super::ensure::ensure_directory;
use super::env::{EnvSnapshot, HOME_VAR, MLGET_HOME_VAR, USERPROFILE_VAR};
use super::error::PathError;

/// Directory created under the user home when `MLGET_HOME` is unset.
pub const BASE_DIR_NAME: &str = ".mlget";
/// Default install destination, under the base directory.
pub const CACHE_DIR_NAME: &str = "cache";
/// Scratch area for index downloads, under the base directory.
pub const SCRATCH_DIR_NAME: &str = "tmp";
/// Directory holding the State Store file.
pub const STORE_DIR_NAME: &str = "db";
/// State Store file name.
pub const STORE_FILE_NAME: &str = "mlget.db";

/// All mlget locations, resolved from one environment snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MlgetPaths {
    pub base_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub store_path: PathBuf,
}

impl MlgetPaths {
    /// Resolve the layout.
    ///
    /// Base directory precedence: `MLGET_HOME`, then `USERPROFILE/.mlget`,
    /// then `HOME/.mlget`, then the OS home directory plus `.mlget`.
    /// Nothing is created on disk.
    pub fn from_env(env: &EnvSnapshot) -> Result<Self, PathError> {
        let base_dir = if let Some(explicit) = env.get(MLGET_HOME_VAR) {
            PathBuf::from(explicit)
        } else {
            let home = env
                .get(USERPROFILE_VAR)
                .or_else(|| env.get(HOME_VAR))
                .map(PathBuf::from)
                .or_else(|| env.home_dir().cloned())
                .ok_or(PathError::NoHomeDir)?;
            home.join(BASE_DIR_NAME)
        };
        Ok(Self::under(base_dir))
    }

    /// Layout rooted at an explicit base directory.
    pub fn under(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            cache_dir: base_dir.join(CACHE_DIR_NAME),
            scratch_dir: base_dir.join(SCRATCH_DIR_NAME),
            store_path: base_dir.join(STORE_DIR_NAME).join(STORE_FILE_NAME),
            base_dir,
        }
    }

    /// Create every directory the layout needs.
    pub fn ensure(&self) -> Result<(), PathError> {
        ensure_directory(&self.base_dir)?;
        ensure_directory(&self.cache_dir)?;
        ensure_directory(&self.scratch_dir)?;
        if let Some(parent) = self.store_path.parent() {
            ensure_directory(parent)?;
        }
        Ok(())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }
}

impl fmt::Display for MlgetPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "base_dir = {}", self.base_dir.display())?;
        writeln!(f, "cache_dir = {}", self.cache_dir.display())?;
        writeln!(f, "scratch_dir = {}", self.scratch_dir.display())?;
        write!(f, "store_path = {}", self.store_path.display())
    }
}
