//! Shared fixtures for handler tests.

use std::path::PathBuf;
use std::sync::Arc;

use mlget_core::{MlgetPaths, PlatformProbe, TransferStrategies};
use mlget_db::TestDb;
use mlget_download::{Aria2Transfer, StreamTransfer};
use tempfile::TempDir;

use crate::bootstrap::{CliContext, bootstrap_with};

/// Probe for a machine with nothing installed.
pub struct BareProbe;

impl PlatformProbe for BareProbe {
    fn find_executable(&self, _name: &str) -> Option<PathBuf> {
        None
    }

    fn query_gpu_driver_output(&self) -> Option<String> {
        None
    }

    fn read_env(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Context over an in-memory store, rooted in a temp directory.
pub struct TestContext {
    pub ctx: CliContext,
    pub db: TestDb,
    pub root: TempDir,
}

pub async fn test_context() -> TestContext {
    let root = TempDir::new().unwrap();
    let paths = MlgetPaths::under(root.path().join("mlget"));
    let db = TestDb::new().await.unwrap();
    let strategies = TransferStrategies {
        accelerated: Arc::new(Aria2Transfer::new()),
        streaming: Arc::new(StreamTransfer::new()),
    };
    let ctx = bootstrap_with(db.repos(), Arc::new(BareProbe), strategies, paths);
    TestContext { ctx, db, root }
}
