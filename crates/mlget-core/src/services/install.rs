//! Install orchestration: resolve, transfer, record, cache.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{
    Candidate, CacheInsert, DEFAULT_CONNECTIONS, NewCacheEntry, NewTask, TaskId, TaskStatus,
    TaskUpdate, TransferRequest, TransferResult, TransferStrategyKind, is_file_url,
};
use crate::events::{InstallEvent, InstallObserver};
use crate::paths::ensure_directory;
use crate::ports::{
    CacheRepository, CoreError, PlatformProbe, ResolveError, SourceResolver, TaskRepository,
    TransferPort,
};

/// The two transfer strategies the orchestrator chooses between.
#[derive(Clone)]
pub struct TransferStrategies {
    pub accelerated: Arc<dyn TransferPort>,
    pub streaming: Arc<dyn TransferPort>,
}

/// Parameters of one install call.
#[derive(Clone, Debug)]
pub struct InstallRequest {
    pub spec: String,
    /// Destination directory; the service default when `None`.
    pub destination_dir: Option<PathBuf>,
    /// Connection count hint for the accelerator.
    pub connections: u32,
    /// Raw accelerator arguments, placed before the fixed ones.
    pub extra_args: Vec<String>,
}

impl InstallRequest {
    pub fn new(spec: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            destination_dir: None,
            connections: DEFAULT_CONNECTIONS,
            extra_args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_destination_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.destination_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub const fn with_connections(mut self, connections: u32) -> Self {
        self.connections = connections;
        self
    }

    #[must_use]
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }
}

/// What happened when the finished file was added to the cache index.
///
/// Never fails the install; a `Failed` registration is logged and reported.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CacheRegistration {
    Registered(i64),
    AlreadyPresent,
    Failed(String),
}

impl From<CacheInsert> for CacheRegistration {
    fn from(insert: CacheInsert) -> Self {
        match insert {
            CacheInsert::Inserted(id) => Self::Registered(id),
            CacheInsert::AlreadyPresent => Self::AlreadyPresent,
        }
    }
}

/// Result of an install call.
///
/// On failure this describes the last attempted candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InstallOutcome {
    pub task_id: TaskId,
    pub candidate: Candidate,
    pub result: TransferResult,
    /// Present only when the transfer succeeded.
    pub cache: Option<CacheRegistration>,
    /// Number of candidates tried.
    pub attempts: usize,
}

impl InstallOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

/// Composes resolver, transfer strategies and the State Store.
pub struct InstallService {
    resolver: Arc<dyn SourceResolver>,
    tasks: Arc<dyn TaskRepository>,
    cache: Arc<dyn CacheRepository>,
    strategies: TransferStrategies,
    probe: Arc<dyn PlatformProbe>,
    default_destination: PathBuf,
    observer: Option<InstallObserver>,
}

impl InstallService {
    pub fn new(
        resolver: Arc<dyn SourceResolver>,
        tasks: Arc<dyn TaskRepository>,
        cache: Arc<dyn CacheRepository>,
        strategies: TransferStrategies,
        probe: Arc<dyn PlatformProbe>,
        default_destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resolver,
            tasks,
            cache,
            strategies,
            probe,
            default_destination: default_destination.into(),
            observer: None,
        }
    }

    /// Subscribe to install events.
    #[must_use]
    pub fn with_observer(mut self, observer: InstallObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run one install.
    ///
    /// Candidates are tried in resolver order, each with its own task row,
    /// until a transfer succeeds. A failed transfer is not an error: it is
    /// reported in the returned outcome. Resolution and store failures are.
    pub async fn install(&self, request: InstallRequest) -> Result<InstallOutcome, CoreError> {
        let candidates = self.resolver.resolve(&request.spec).await?;
        info!(spec = %request.spec, count = candidates.len(), "Resolved install spec");
        self.emit(&InstallEvent::Resolved {
            candidates: candidates.clone(),
        });

        let destination_dir = request
            .destination_dir
            .clone()
            .unwrap_or_else(|| self.default_destination.clone());
        ensure_directory(&destination_dir)?;

        let mut last_failure = None;
        for (index, candidate) in candidates.into_iter().enumerate() {
            let outcome = self
                .attempt(&request, &destination_dir, candidate, index + 1)
                .await?;
            if outcome.is_success() {
                return Ok(outcome);
            }
            last_failure = Some(outcome);
        }

        // The resolver contract guarantees at least one candidate.
        last_failure.ok_or_else(|| {
            CoreError::Resolve(ResolveError::NoCandidates {
                spec: request.spec.clone(),
            })
        })
    }

    async fn attempt(
        &self,
        request: &InstallRequest,
        destination_dir: &Path,
        candidate: Candidate,
        attempt: usize,
    ) -> Result<InstallOutcome, CoreError> {
        let location = candidate.fetch_location();
        let file_name = candidate.file_name();
        let out_path = destination_dir.join(&file_name);

        let task_id = self
            .tasks
            .create(&NewTask::queued(location.clone(), out_path.clone()))
            .await?;
        info!(task_id, url = %location, out_path = %out_path.display(), "Download registered");
        self.emit(&InstallEvent::TaskRegistered {
            task_id,
            out_path: out_path.clone(),
        });

        let (strategy, accelerator_missing) = self.select_strategy(&location);
        self.emit(&InstallEvent::StrategySelected {
            task_id,
            strategy: strategy.kind(),
            accelerator_missing,
        });

        let mut transfer = TransferRequest::new(location, destination_dir)
            .with_connections(request.connections)
            .with_extra_args(request.extra_args.clone())
            .with_file_name(file_name);
        if let Some(observer) = self.observer.clone() {
            transfer = transfer.with_progress(Box::new(move |downloaded, total| {
                observer(&InstallEvent::Progress {
                    task_id,
                    downloaded,
                    total,
                });
            }));
        }

        let result = match strategy.transfer(transfer).await {
            Ok(result) => result,
            Err(e) => {
                warn!(task_id, error = %e, "Transfer could not run");
                self.tasks
                    .update(task_id, &TaskUpdate::status(TaskStatus::Failed))
                    .await?;
                return Err(e.into());
            }
        };

        if !result.is_success() {
            warn!(
                task_id,
                status = result.status_code,
                diagnostic = result.diagnostic(),
                "Transfer failed"
            );
            self.tasks
                .update(task_id, &TaskUpdate::status(TaskStatus::Failed))
                .await?;
            self.emit(&InstallEvent::AttemptFailed {
                task_id,
                status_code: result.status_code,
                diagnostic: result.diagnostic().to_string(),
            });
            return Ok(InstallOutcome {
                task_id,
                candidate,
                result,
                cache: None,
                attempts: attempt,
            });
        }

        let size = file_size(&result.destination);
        self.tasks
            .update(
                task_id,
                &TaskUpdate::status(TaskStatus::Completed)
                    .with_downloaded_bytes(size)
                    .with_total_bytes(size),
            )
            .await?;
        info!(task_id, destination = %result.destination.display(), "Download completed");

        let cache = self.register_in_cache(&result.destination).await;
        Ok(InstallOutcome {
            task_id,
            candidate,
            result,
            cache: Some(cache),
            attempts: attempt,
        })
    }

    /// Choose the strategy for a fetch location.
    ///
    /// Returns the port and whether the accelerator was wanted but absent.
    fn select_strategy(&self, location: &str) -> (Arc<dyn TransferPort>, bool) {
        let accelerated = &self.strategies.accelerated;
        let available = accelerated
            .required_executable()
            .is_none_or(|executable| self.probe.find_executable(executable).is_some());

        match preferred_strategy(location, available) {
            TransferStrategyKind::Accelerated => {
                info!(location, "Using accelerated transfer");
                (Arc::clone(accelerated), false)
            }
            TransferStrategyKind::Streaming => {
                let missing = !available && !is_file_url(location);
                if missing {
                    warn!("Accelerator not found, falling back to streaming transfer");
                } else {
                    debug!(location, "Using streaming transfer");
                }
                (Arc::clone(&self.strategies.streaming), missing)
            }
        }
    }

    async fn register_in_cache(&self, path: &Path) -> CacheRegistration {
        match self.cache.add(&NewCacheEntry::new(path)).await {
            Ok(insert) => {
                debug!(path = %path.display(), ?insert, "Cache entry registered");
                insert.into()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cache registration failed");
                CacheRegistration::Failed(e.to_string())
            }
        }
    }

    fn emit(&self, event: &InstallEvent) {
        if let Some(observer) = &self.observer {
            observer(event);
        }
    }
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Strategy a location would use given accelerator availability.
///
/// Exposed for adapters that want to report the choice up front.
#[must_use]
pub fn preferred_strategy(location: &str, accelerator_available: bool) -> TransferStrategyKind {
    if accelerator_available && !is_file_url(location) {
        TransferStrategyKind::Accelerated
    } else {
        TransferStrategyKind::Streaming
    }
}
