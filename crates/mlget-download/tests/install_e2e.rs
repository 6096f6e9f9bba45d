//! End-to-end install tests.
//!
//! Real resolver, real transfer strategies and an in-memory State Store,
//! wired through the core `InstallService`. Only the platform probe and the
//! index-download helper are faked.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mlget_core::domain::file_uri;
use mlget_core::{
    CacheRegistration, IndexDownloader, InstallEvent, InstallRequest, InstallService,
    PlatformProbe, ResolveError, TaskStatus, TransferStrategies, TransferStrategyKind,
};
use mlget_db::TestDb;
use mlget_download::{Aria2Transfer, SpecResolver, StreamTransfer};
use tempfile::TempDir;

#[derive(Default)]
struct FakeProbe {
    executables: HashSet<String>,
}

impl FakeProbe {
    fn with_accelerator() -> Self {
        Self {
            executables: HashSet::from(["aria2c".to_string()]),
        }
    }
}

impl PlatformProbe for FakeProbe {
    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        self.executables
            .contains(name)
            .then(|| PathBuf::from("/usr/bin").join(name))
    }

    fn query_gpu_driver_output(&self) -> Option<String> {
        None
    }

    fn read_env(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Index helper returning a fixed file list.
struct StaticIndex(Vec<PathBuf>);

#[async_trait]
impl IndexDownloader for StaticIndex {
    async fn download(&self, _spec: &str, _index_url: &str) -> Result<Vec<PathBuf>, ResolveError> {
        Ok(self.0.clone())
    }
}

struct Harness {
    db: TestDb,
    service: InstallService,
    events: Arc<Mutex<Vec<InstallEvent>>>,
}

async fn harness(
    probe: FakeProbe,
    index: StaticIndex,
    accelerated: Aria2Transfer,
    default_destination: &Path,
) -> Harness {
    let db = TestDb::new().await.unwrap();
    let repos = db.repos();
    let probe: Arc<dyn PlatformProbe> = Arc::new(probe);
    let resolver = SpecResolver::new(Arc::clone(&probe), Arc::new(index));
    let strategies = TransferStrategies {
        accelerated: Arc::new(accelerated),
        streaming: Arc::new(StreamTransfer::new()),
    };

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let service = InstallService::new(
        Arc::new(resolver),
        repos.tasks,
        repos.cache,
        strategies,
        probe,
        default_destination,
    )
    .with_observer(Arc::new(move |event: &InstallEvent| {
        sink.lock().unwrap().push(event.clone());
    }));

    Harness { db, service, events }
}

fn strategy_events(events: &Mutex<Vec<InstallEvent>>) -> Vec<(TransferStrategyKind, bool)> {
    events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            InstallEvent::StrategySelected {
                strategy,
                accelerator_missing,
                ..
            } => Some((*strategy, *accelerator_missing)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn local_path_install_records_task_and_cache_entry() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("pkg-1.0-py3-none-any.whl");
    std::fs::write(&source, vec![7u8; 12_345]).unwrap();
    let cache_dir = tmp.path().join("cache");

    let h = harness(
        FakeProbe::default(),
        StaticIndex(Vec::new()),
        Aria2Transfer::new(),
        &cache_dir,
    )
    .await;

    let outcome = h
        .service
        .install(InstallRequest::new(source.to_string_lossy()))
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.attempts, 1);
    let installed = cache_dir.join("pkg-1.0-py3-none-any.whl");
    assert_eq!(outcome.result.destination, installed);
    assert_eq!(std::fs::read(&installed).unwrap().len(), 12_345);
    assert!(matches!(outcome.cache, Some(CacheRegistration::Registered(_))));

    let tasks = h.db.task_repository();
    let rows = mlget_core::TaskRepository::list(&tasks).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, TaskStatus::Completed);
    assert_eq!(rows[0].out_path, installed);
    assert_eq!(rows[0].downloaded_bytes, 12_345);

    let cache = h.db.cache_repository();
    let entries = mlget_core::CacheRepository::list(&cache).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].file_path, installed);
    assert_eq!(entries[0].size, 12_345);

    // Local sources never go through the accelerator, and that is not a
    // fallback worth announcing.
    assert_eq!(
        strategy_events(&h.events),
        vec![(TransferStrategyKind::Streaming, false)]
    );
}

#[tokio::test]
async fn file_uri_streams_even_with_accelerator_present() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("torch-2.1.0.tar.gz");
    std::fs::write(&source, b"sdist").unwrap();
    let out = tmp.path().join("out");

    let h = harness(
        FakeProbe::with_accelerator(),
        StaticIndex(Vec::new()),
        Aria2Transfer::with_executable("/nonexistent/aria2c"),
        tmp.path(),
    )
    .await;

    let outcome = h
        .service
        .install(InstallRequest::new(file_uri(&source)).with_destination_dir(&out))
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.result.strategy, TransferStrategyKind::Streaming);
    assert_eq!(std::fs::read(out.join("torch-2.1.0.tar.gz")).unwrap(), b"sdist");
}

#[cfg(unix)]
#[tokio::test]
async fn local_files_with_url_delimiters_in_their_names_install() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let h = harness(
        FakeProbe::default(),
        StaticIndex(Vec::new()),
        Aria2Transfer::new(),
        &out,
    )
    .await;

    for name in ["pkg#1-1.0.whl", "pkg%41-1.0.whl", "pkg?x-1.0.whl"] {
        let source = tmp.path().join(name);
        std::fs::write(&source, name.as_bytes()).unwrap();

        let outcome = h
            .service
            .install(InstallRequest::new(source.to_string_lossy()))
            .await
            .unwrap();

        assert!(outcome.is_success(), "{name}: {}", outcome.result.diagnostic());
        assert_eq!(outcome.result.destination, out.join(name));
        assert_eq!(std::fs::read(out.join(name)).unwrap(), name.as_bytes());
    }

    let tasks = h.db.task_repository();
    let rows = mlget_core::TaskRepository::list(&tasks).await.unwrap();
    assert!(rows.iter().all(|row| row.status == TaskStatus::Completed));
}

#[cfg(unix)]
#[tokio::test]
async fn accelerator_that_cannot_start_leaves_failed_task() {
    let tmp = TempDir::new().unwrap();
    // A directory is found but cannot be executed.
    let not_executable = tmp.path().join("aria2c");
    std::fs::create_dir(&not_executable).unwrap();

    let h = harness(
        FakeProbe::with_accelerator(),
        StaticIndex(Vec::new()),
        Aria2Transfer::with_executable(&not_executable),
        tmp.path(),
    )
    .await;

    let err = h
        .service
        .install(InstallRequest::new("https://example.invalid/pkg-1.0.whl"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        mlget_core::CoreError::Transfer(mlget_core::TransferError::Spawn { .. })
    ));

    let tasks = h.db.task_repository();
    let rows = mlget_core::TaskRepository::list(&tasks).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, TaskStatus::Failed);
}

#[tokio::test]
async fn missing_accelerator_falls_back_and_records_failure() {
    let tmp = TempDir::new().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let h = harness(
        FakeProbe::default(),
        StaticIndex(Vec::new()),
        Aria2Transfer::new(),
        tmp.path(),
    )
    .await;

    let outcome = h
        .service
        .install(InstallRequest::new(format!("http://{addr}/pkg.whl")))
        .await
        .unwrap();

    assert!(!outcome.is_success());
    assert_eq!(outcome.result.status_code, 2);
    assert_eq!(outcome.result.destination, tmp.path().join("pkg.whl.part"));
    assert!(outcome.cache.is_none());
    assert_eq!(
        strategy_events(&h.events),
        vec![(TransferStrategyKind::Streaming, true)]
    );

    let rows = mlget_core::TaskRepository::list(&h.db.task_repository())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, TaskStatus::Failed);

    let entries = mlget_core::CacheRepository::list(&h.db.cache_repository())
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn variant_candidates_are_tried_in_order() {
    let tmp = TempDir::new().unwrap();
    let good = tmp.path().join("torch-2.1.0+cpu-cp311-linux_x86_64.whl");
    std::fs::write(&good, b"wheel").unwrap();
    let missing = tmp.path().join("torch-2.1.0-missing.whl");
    let out = tmp.path().join("out");

    let h = harness(
        FakeProbe::default(),
        StaticIndex(vec![missing, good]),
        Aria2Transfer::new(),
        &out,
    )
    .await;

    let outcome = h
        .service
        .install(InstallRequest::new("torch==2.1.0"))
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.attempts, 2);

    let rows = mlget_core::TaskRepository::list(&h.db.task_repository())
        .await
        .unwrap();
    let statuses: Vec<_> = rows.iter().map(|t| t.status).collect();
    // Newest first.
    assert_eq!(statuses, vec![TaskStatus::Completed, TaskStatus::Failed]);

    let failures = h
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, InstallEvent::AttemptFailed { .. }))
        .count();
    assert_eq!(failures, 1);
}

#[tokio::test]
async fn unresolvable_spec_creates_no_task() {
    let tmp = TempDir::new().unwrap();
    let h = harness(
        FakeProbe::default(),
        StaticIndex(Vec::new()),
        Aria2Transfer::new(),
        tmp.path(),
    )
    .await;

    let err = h
        .service
        .install(InstallRequest::new("numpy"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Could not resolve 'numpy'"));
    let rows = mlget_core::TaskRepository::list(&h.db.task_repository())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn accelerator_handles_remote_urls_when_present() {
    let tmp = TempDir::new().unwrap();
    let script = tmp.path().join("fake_aria2.sh");
    std::fs::write(
        &script,
        r#"
while [ $# -gt 0 ]; do
  case "$1" in
    --dir) dir="$2"; shift ;;
    --out) out="$2"; shift ;;
  esac
  shift
done
printf 'accelerated' > "$dir/$out"
"#,
    )
    .unwrap();
    let out = tmp.path().join("out");

    let h = harness(
        FakeProbe::with_accelerator(),
        StaticIndex(Vec::new()),
        Aria2Transfer::with_executable("sh"),
        &out,
    )
    .await;

    let outcome = h
        .service
        .install(
            InstallRequest::new("https://files.example.com/whl/pkg-2.0.whl")
                .with_connections(4)
                .with_extra_args(vec![script.to_string_lossy().into_owned()]),
        )
        .await
        .unwrap();

    assert!(outcome.is_success(), "{}", outcome.result.diagnostic());
    assert_eq!(outcome.result.strategy, TransferStrategyKind::Accelerated);
    assert_eq!(std::fs::read(out.join("pkg-2.0.whl")).unwrap(), b"accelerated");
    assert_eq!(
        strategy_events(&h.events),
        vec![(TransferStrategyKind::Accelerated, false)]
    );

    let entries = mlget_core::CacheRepository::list(&h.db.cache_repository())
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].size, 11);
}
