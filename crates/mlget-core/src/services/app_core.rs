//! `AppCore` - the primary application facade.
//!
//! This is the composition root for core services. Adapters receive an
//! `AppCore` instance and use it to access all functionality.

use std::path::PathBuf;
use std::sync::Arc;

use crate::events::InstallObserver;
use crate::ports::{PlatformProbe, Repos, SourceResolver};

use super::{InstallService, StatusService, TransferStrategies};

/// The core application facade.
///
/// # Example
///
/// ```ignore
/// let repos = Repos::new(task_repo, cache_repo);
/// let core = AppCore::new(repos, resolver, strategies, probe, paths.cache_dir());
///
/// let outcome = core.installs().install(InstallRequest::new("torch")).await?;
/// let tasks = core.status().list_tasks().await?;
/// ```
pub struct AppCore {
    installs: InstallService,
    status: StatusService,
}

impl AppCore {
    pub fn new(
        repos: Repos,
        resolver: Arc<dyn SourceResolver>,
        strategies: TransferStrategies,
        probe: Arc<dyn PlatformProbe>,
        default_destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            installs: InstallService::new(
                resolver,
                Arc::clone(&repos.tasks),
                Arc::clone(&repos.cache),
                strategies,
                probe,
                default_destination,
            ),
            status: StatusService::new(repos.tasks, repos.cache),
        }
    }

    /// Attach an observer for install events.
    #[must_use]
    pub fn with_install_observer(mut self, observer: InstallObserver) -> Self {
        self.installs = self.installs.with_observer(observer);
        self
    }

    /// Access the install service.
    pub const fn installs(&self) -> &InstallService {
        &self.installs
    }

    /// Access the status service.
    pub const fn status(&self) -> &StatusService {
        &self.status
    }
}
