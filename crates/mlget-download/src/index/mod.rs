//! Index-download helper backed by `pip download`.
//!
//! Fetches a single binary package (no dependencies) from an alternate
//! wheel index into a staging directory under the scratch dir, then hands
//! back the package files found there.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

use mlget_core::domain::BINARY_PACKAGE_SUFFIXES;
use mlget_core::{IndexDownloader, PlatformProbe, ResolveError};

/// Staging directory name, relative to the scratch dir.
pub const STAGING_SUBDIR: &str = "resolver_pip_download";

/// Environment variable naming the interpreter to use.
pub const PYTHON_OVERRIDE_VAR: &str = "MLGET_PYTHON";

#[cfg(target_os = "windows")]
const PYTHON_CANDIDATES: &[&str] = &["python"];

#[cfg(not(target_os = "windows"))]
const PYTHON_CANDIDATES: &[&str] = &["python3", "python"];

/// [`IndexDownloader`] that shells out to `python -m pip download`.
pub struct PipIndexDownloader {
    staging_dir: PathBuf,
    probe: Arc<dyn PlatformProbe>,
    interpreter: Option<(PathBuf, Vec<String>)>,
}

impl PipIndexDownloader {
    /// Stage downloads under `<scratch_dir>/resolver_pip_download`.
    pub fn new(scratch_dir: &Path, probe: Arc<dyn PlatformProbe>) -> Self {
        Self {
            staging_dir: scratch_dir.join(STAGING_SUBDIR),
            probe,
            interpreter: None,
        }
    }

    /// Use a fixed interpreter invocation instead of searching the path.
    ///
    /// `leading_args` go between the program and `-m pip ...`.
    #[must_use]
    pub fn with_interpreter(
        mut self,
        program: impl Into<PathBuf>,
        leading_args: Vec<String>,
    ) -> Self {
        self.interpreter = Some((program.into(), leading_args));
        self
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    fn interpreter(&self) -> Option<(PathBuf, Vec<String>)> {
        if let Some(fixed) = &self.interpreter {
            return Some(fixed.clone());
        }
        if let Some(custom) = self.probe.read_env(PYTHON_OVERRIDE_VAR) {
            let custom = custom.trim();
            if !custom.is_empty() {
                return Some((PathBuf::from(custom), Vec::new()));
            }
        }
        PYTHON_CANDIDATES
            .iter()
            .find_map(|name| self.probe.find_executable(name))
            .map(|path| (path, Vec::new()))
    }

    /// Remove leftover files from a previous run; the directory itself stays.
    async fn prepare_staging_dir(&self) -> Result<(), ResolveError> {
        if let Ok(mut entries) = fs::read_dir(&self.staging_dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                let is_file = entry
                    .file_type()
                    .await
                    .is_ok_and(|file_type| file_type.is_file());
                if is_file {
                    let _ = fs::remove_file(entry.path()).await;
                }
            }
        }
        fs::create_dir_all(&self.staging_dir).await.map_err(|e| {
            ResolveError::Io(format!("{}: {e}", self.staging_dir.display()))
        })
    }

    async fn collect_packages(&self) -> Result<Vec<PathBuf>, ResolveError> {
        let io_err =
            |e: std::io::Error| ResolveError::Io(format!("{}: {e}", self.staging_dir.display()));

        let mut entries = fs::read_dir(&self.staging_dir).await.map_err(io_err)?;
        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if file_type.is_file() && BINARY_PACKAGE_SUFFIXES.iter().any(|s| name.ends_with(s)) {
                let path = fs::canonicalize(entry.path()).await.map_err(io_err)?;
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }
}

#[async_trait]
impl IndexDownloader for PipIndexDownloader {
    async fn download(&self, spec: &str, index_url: &str) -> Result<Vec<PathBuf>, ResolveError> {
        let failure = |message: String| ResolveError::IndexDownload {
            spec: spec.to_string(),
            index_url: index_url.to_string(),
            message,
        };

        let (program, leading_args) = self.interpreter().ok_or_else(|| {
            failure(format!(
                "Python not found in PATH (tried: {})",
                PYTHON_CANDIDATES.join(", ")
            ))
        })?;

        self.prepare_staging_dir().await?;

        info!(spec, index_url, "Downloading package from variant index");
        let output = Command::new(&program)
            .args(&leading_args)
            .args(["-m", "pip", "download", spec, "--no-deps", "--only-binary=:all:"])
            .arg("--dest")
            .arg(&self.staging_dir)
            .args(["-f", index_url])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| failure(format!("failed to run {}: {e}", program.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure(stderr.trim().to_string()));
        }

        let files = self.collect_packages().await?;
        debug!(count = files.len(), dir = %self.staging_dir.display(), "Collected staged packages");
        Ok(files)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeProbe {
        executables: HashMap<String, PathBuf>,
        env: HashMap<String, String>,
    }

    impl PlatformProbe for FakeProbe {
        fn find_executable(&self, name: &str) -> Option<PathBuf> {
            self.executables.get(name).cloned()
        }

        fn query_gpu_driver_output(&self) -> Option<String> {
            None
        }

        fn read_env(&self, name: &str) -> Option<String> {
            self.env.get(name).cloned()
        }
    }

    /// Writes `script` to the temp dir and runs it through `sh`.
    fn downloader_with_script(tmp: &TempDir, script: &str) -> PipIndexDownloader {
        let script_path = tmp.path().join("fake_pip.sh");
        std::fs::write(&script_path, script).unwrap();
        PipIndexDownloader::new(&tmp.path().join("scratch"), Arc::new(FakeProbe::default()))
            .with_interpreter("sh", vec![script_path.to_string_lossy().into_owned()])
    }

    const WRITES_PACKAGES: &str = r#"
while [ $# -gt 0 ]; do
  if [ "$1" = "--dest" ]; then dest="$2"; fi
  shift
done
echo wheel > "$dest/torch-2.1.0-cp311-none-any.whl"
echo sdist > "$dest/extra-1.0.tar.gz"
echo notes > "$dest/README.txt"
"#;

    #[tokio::test]
    async fn collects_package_files_only() {
        let tmp = TempDir::new().unwrap();
        let downloader = downloader_with_script(&tmp, WRITES_PACKAGES);

        let files = downloader
            .download("torch", "https://download.pytorch.org/whl/cpu/")
            .await
            .unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["extra-1.0.tar.gz", "torch-2.1.0-cp311-none-any.whl"]);
        assert!(files.iter().all(|p| p.is_absolute()));
    }

    #[tokio::test]
    async fn passes_pip_arguments() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("args.log");
        let script = format!("echo \"$@\" > '{}'\n", log.display());
        let downloader = downloader_with_script(&tmp, &script);

        downloader
            .download("torch==2.1.0", "https://download.pytorch.org/whl/cu118/")
            .await
            .unwrap();

        let args = std::fs::read_to_string(&log).unwrap();
        let expected = format!(
            "-m pip download torch==2.1.0 --no-deps --only-binary=:all: --dest {} -f https://download.pytorch.org/whl/cu118/",
            downloader.staging_dir().display()
        );
        assert_eq!(args.trim(), expected);
    }

    #[tokio::test]
    async fn stale_files_are_cleared_before_running() {
        let tmp = TempDir::new().unwrap();
        let downloader = downloader_with_script(&tmp, "exit 0\n");
        std::fs::create_dir_all(downloader.staging_dir()).unwrap();
        std::fs::write(downloader.staging_dir().join("old-0.1.whl"), b"stale").unwrap();
        std::fs::create_dir(downloader.staging_dir().join("keep")).unwrap();

        let files = downloader.download("torch", "idx").await.unwrap();

        assert!(files.is_empty());
        assert!(!downloader.staging_dir().join("old-0.1.whl").exists());
        assert!(downloader.staging_dir().join("keep").is_dir());
    }

    #[tokio::test]
    async fn nonzero_exit_wraps_stderr() {
        let tmp = TempDir::new().unwrap();
        let downloader = downloader_with_script(
            &tmp,
            "echo 'ERROR: No matching distribution found for torch' >&2\nexit 1\n",
        );

        let err = downloader.download("torch", "idx").await.unwrap_err();
        match err {
            ResolveError::IndexDownload { spec, message, .. } => {
                assert_eq!(spec, "torch");
                assert_eq!(message, "ERROR: No matching distribution found for torch");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_python_is_an_index_download_error() {
        let tmp = TempDir::new().unwrap();
        let downloader = PipIndexDownloader::new(tmp.path(), Arc::new(FakeProbe::default()));

        let err = downloader.download("torch", "idx").await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::IndexDownload { ref message, .. } if message.contains("Python not found")
        ));
    }

    #[test]
    fn interpreter_override_wins_over_path_search() {
        let mut probe = FakeProbe::default();
        probe
            .executables
            .insert("python3".into(), PathBuf::from("/usr/bin/python3"));
        probe
            .env
            .insert(PYTHON_OVERRIDE_VAR.into(), "/opt/venv/bin/python".into());

        let downloader = PipIndexDownloader::new(Path::new("/tmp"), Arc::new(probe));
        let (program, args) = downloader.interpreter().unwrap();
        assert_eq!(program, PathBuf::from("/opt/venv/bin/python"));
        assert!(args.is_empty());
    }

    #[test]
    fn first_python_candidate_on_path_is_used() {
        let mut probe = FakeProbe::default();
        probe
            .executables
            .insert("python".into(), PathBuf::from("/usr/bin/python"));

        let downloader = PipIndexDownloader::new(Path::new("/tmp"), Arc::new(probe));
        let (program, _) = downloader.interpreter().unwrap();
        assert_eq!(program, PathBuf::from("/usr/bin/python"));
    }
}
