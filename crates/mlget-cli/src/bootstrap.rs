//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter. All concrete implementations are instantiated here:
//! - State Store repositories (via mlget-db)
//! - Platform probe (via mlget-runtime)
//! - Resolver, index helper and transfer strategies (via mlget-download)
//!
//! Command handlers receive the fully-composed `AppCore` and delegate work to it.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use mlget_core::{AppCore, EnvSnapshot, MlgetPaths, PlatformProbe, Repos, TransferStrategies};
use mlget_db::StoreFactory;
use mlget_download::{Aria2Transfer, PipIndexDownloader, SpecResolver, StreamTransfer};
use mlget_runtime::DefaultPlatformProbe;

use crate::error::CliError;
use crate::presentation::InstallReporter;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Resolved directory layout.
    pub paths: MlgetPaths,
}

impl CliConfig {
    /// Resolve paths from the current process environment.
    pub fn from_environment() -> Result<Self> {
        let env = EnvSnapshot::capture();
        Ok(Self {
            paths: MlgetPaths::from_env(&env).map_err(CliError::from)?,
        })
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// The core application facade.
    pub app: AppCore,
    /// Directory layout in use.
    pub paths: MlgetPaths,
    /// Renders install events on the terminal.
    pub reporter: Arc<InstallReporter>,
}

impl CliContext {
    /// Access the `AppCore`.
    pub const fn app(&self) -> &AppCore {
        &self.app
    }

    pub const fn paths(&self) -> &MlgetPaths {
        &self.paths
    }

    pub fn reporter(&self) -> &InstallReporter {
        &self.reporter
    }
}

/// Bootstrap the CLI application.
///
/// Creates the directories, opens the State Store and wires the default
/// adapters into an `AppCore`.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    config.paths.ensure().map_err(CliError::from)?;
    debug!(store = %config.paths.store_path.display(), "Opening state store");
    let repos = StoreFactory::open(&config.paths.store_path)
        .await
        .map_err(|e| CliError::Database(format!("{e:#}")))?;

    let probe: Arc<dyn PlatformProbe> = Arc::new(DefaultPlatformProbe::new());
    let strategies = TransferStrategies {
        accelerated: Arc::new(Aria2Transfer::new()),
        streaming: Arc::new(StreamTransfer::new()),
    };

    Ok(bootstrap_with(repos, probe, strategies, config.paths))
}

/// Compose a context from explicit adapters (for testing).
///
/// The resolver always uses the `pip download` index helper staged under
/// the scratch directory.
pub fn bootstrap_with(
    repos: Repos,
    probe: Arc<dyn PlatformProbe>,
    strategies: TransferStrategies,
    paths: MlgetPaths,
) -> CliContext {
    let index = Arc::new(PipIndexDownloader::new(&paths.scratch_dir, Arc::clone(&probe)));
    let resolver = Arc::new(SpecResolver::new(Arc::clone(&probe), index));
    let reporter = Arc::new(InstallReporter::new());

    let app = AppCore::new(repos, resolver, strategies, probe, paths.cache_dir.clone())
        .with_install_observer(reporter.observer());

    CliContext {
        app,
        paths,
        reporter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_bootstrap_creates_layout_and_store() {
        let root = TempDir::new().unwrap();
        let paths = MlgetPaths::under(root.path().join("home"));

        let ctx = bootstrap(CliConfig {
            paths: paths.clone(),
        })
        .await
        .unwrap();

        assert!(paths.cache_dir.is_dir());
        assert!(paths.scratch_dir.is_dir());
        assert!(paths.store_path.is_file());
        assert!(ctx.app().status().list_tasks().await.unwrap().is_empty());
    }
}
