//! Path utilities for mlget data directories.
//!
//! This module provides the canonical path resolution for all mlget components:
//! - Cache directory (default install destination)
//! - Scratch directory (index-download staging)
//! - State Store file
//!
//! # Design
//!
//! - Resolution is a pure function of an [`EnvSnapshot`]
//! - Directory creation happens once, in [`MlgetPaths::ensure`]
//! - Returns `PathBuf` and `PathError` for clear error handling

mod config;
mod ensure;
mod env;
mod error;

pub use config::{
    BASE_DIR_NAME, CACHE_DIR_NAME, MlgetPaths, SCRATCH_DIR_NAME, STORE_DIR_NAME, STORE_FILE_NAME,
};
pub use ensure::ensure_directory;
pub use env::{EnvSnapshot, HOME_VAR, MLGET_HOME_VAR, USERPROFILE_VAR};
pub use error::PathError;
