#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod events;
pub mod paths;
pub mod ports;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    CacheEntry, CacheInsert, Candidate, DownloadTask, NewCacheEntry, NewTask, TaskId, TaskStatus,
    TaskUpdate, TransferRequest, TransferResult, TransferStrategyKind,
};
pub use events::{InstallEvent, InstallObserver};
pub use paths::{EnvSnapshot, MlgetPaths, PathError};
pub use ports::{
    CacheRepository, CoreError, IndexDownloader, PlatformProbe, Repos, RepositoryError,
    ResolveError, SourceResolver, TaskRepository, TransferError, TransferPort,
};
pub use services::{
    AppCore, CacheRegistration, InstallOutcome, InstallRequest, InstallService, StatusService,
    TransferStrategies,
};
