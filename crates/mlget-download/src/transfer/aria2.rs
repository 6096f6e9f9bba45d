//! Accelerated transfer through an external `aria2c` process.
//!
//! The process runs to completion and its exit code and output are reported
//! verbatim. Segmenting and resuming are entirely aria2's business.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use mlget_core::{
    TransferError, TransferPort, TransferRequest, TransferResult, TransferStrategyKind,
};

/// Accelerator executable looked up on the path.
pub const ACCELERATOR_EXECUTABLE: &str = "aria2c";

/// Exit status reported when the executable vanished between probe and spawn.
const NOT_FOUND_STATUS: i32 = 127;

/// [`TransferPort`] that drives `aria2c`.
pub struct Aria2Transfer {
    executable: PathBuf,
}

impl Default for Aria2Transfer {
    fn default() -> Self {
        Self::new()
    }
}

impl Aria2Transfer {
    pub fn new() -> Self {
        Self {
            executable: PathBuf::from(ACCELERATOR_EXECUTABLE),
        }
    }

    /// Run a different program in place of `aria2c`.
    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Command-line arguments for a request.
    ///
    /// Caller-supplied extra arguments come first so they can override the
    /// fixed ones.
    pub fn build_args(request: &TransferRequest) -> Vec<String> {
        let connections = request.connections.max(1).to_string();
        let mut args = request.extra_args.clone();
        args.extend([
            "--enable-rpc=false".to_string(),
            format!("--split={connections}"),
            format!("--max-connection-per-server={connections}"),
            "--continue=true".to_string(),
            "--dir".to_string(),
            request.destination_dir.to_string_lossy().into_owned(),
            "--out".to_string(),
            request.file_name(),
            request.url.clone(),
        ]);
        args
    }
}

#[async_trait]
impl TransferPort for Aria2Transfer {
    fn kind(&self) -> TransferStrategyKind {
        TransferStrategyKind::Accelerated
    }

    fn required_executable(&self) -> Option<&str> {
        Some(ACCELERATOR_EXECUTABLE)
    }

    async fn transfer(&self, request: TransferRequest) -> Result<TransferResult, TransferError> {
        tokio::fs::create_dir_all(&request.destination_dir)
            .await
            .map_err(|e| TransferError::Destination {
                path: request.destination_dir.display().to_string(),
                reason: e.to_string(),
            })?;

        // aria2c keeps partial data under the final name, even on failure.
        let destination = request.final_path();
        let resumable = request.part_path().exists();
        let args = Self::build_args(&request);
        info!(url = %request.url, out = %destination.display(), resumable, "Starting aria2c");
        debug!(?args, "aria2c arguments");

        let output = match Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(TransferResult {
                    url: request.url,
                    destination,
                    status_code: NOT_FOUND_STATUS,
                    stdout: String::new(),
                    stderr: format!("{} not found: {e}", self.executable.display()),
                    resumable,
                    strategy: TransferStrategyKind::Accelerated,
                });
            }
            Err(e) => {
                return Err(TransferError::Spawn {
                    program: self.executable.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        Ok(TransferResult {
            url: request.url,
            destination,
            status_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            resumable,
            strategy: TransferStrategyKind::Accelerated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn extra_args_precede_fixed_args() {
        let request = TransferRequest::new("https://h/x/torch.whl", "/cache")
            .with_connections(4)
            .with_extra_args(vec!["--max-tries=3".into(), "--quiet".into()]);

        let args = Aria2Transfer::build_args(&request);
        assert_eq!(
            args,
            vec![
                "--max-tries=3",
                "--quiet",
                "--enable-rpc=false",
                "--split=4",
                "--max-connection-per-server=4",
                "--continue=true",
                "--dir",
                "/cache",
                "--out",
                "torch.whl",
                "https://h/x/torch.whl",
            ]
        );
    }

    #[test]
    fn bare_host_uses_default_file_name() {
        let request = TransferRequest::new("https://example.com/", "/cache");
        let args = Aria2Transfer::build_args(&request);
        let out = args.iter().position(|a| a == "--out").unwrap();
        assert_eq!(args[out + 1], mlget_core::domain::DEFAULT_FILE_NAME);
    }

    #[test]
    fn declares_required_executable() {
        let port = Aria2Transfer::new();
        assert_eq!(port.required_executable(), Some("aria2c"));
        assert_eq!(port.kind(), TransferStrategyKind::Accelerated);
    }

    #[tokio::test]
    async fn missing_executable_is_reported_in_result() {
        let tmp = tempfile::tempdir().unwrap();
        let port = Aria2Transfer::with_executable("/nonexistent/aria2c-missing");

        let result = port
            .transfer(TransferRequest::new("https://h/a.whl", tmp.path()))
            .await
            .unwrap();

        assert_eq!(result.status_code, 127);
        assert!(!result.is_success());
        assert_eq!(result.destination, tmp.path().join("a.whl"));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use tempfile::TempDir;

        fn script(tmp: &TempDir, body: &str) -> String {
            let path = tmp.path().join("fake_aria2.sh");
            std::fs::write(&path, body).unwrap();
            path.to_string_lossy().into_owned()
        }

        fn sh_request(script: String, url: &str, dir: &Path) -> TransferRequest {
            // The script path is the first extra argument, so `sh` runs it
            // with the aria2 arguments that follow.
            TransferRequest::new(url, dir).with_extra_args(vec![script])
        }

        #[tokio::test]
        async fn captures_exit_code_and_output() {
            let tmp = TempDir::new().unwrap();
            let body = "echo downloading\necho 'errorCode=3 Resource not found' >&2\nexit 3\n";
            let request =
                sh_request(script(&tmp, body), "https://h/pkg.whl", &tmp.path().join("out"));

            let result = Aria2Transfer::with_executable("sh")
                .transfer(request)
                .await
                .unwrap();

            assert_eq!(result.status_code, 3);
            assert_eq!(result.stdout, "downloading\n");
            assert_eq!(result.diagnostic(), "errorCode=3 Resource not found");
            assert!(!result.resumable);
            assert!(tmp.path().join("out").is_dir());
        }

        #[tokio::test]
        async fn success_reports_final_path() {
            let tmp = TempDir::new().unwrap();
            // Writes the file where --dir/--out point.
            let body = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    --dir) dir="$2"; shift ;;
    --out) out="$2"; shift ;;
  esac
  shift
done
printf 'payload' > "$dir/$out"
"#;
            let request = sh_request(script(&tmp, body), "https://h/p/pkg.whl", tmp.path());

            let result = Aria2Transfer::with_executable("sh")
                .transfer(request)
                .await
                .unwrap();

            assert!(result.is_success());
            assert_eq!(result.destination, tmp.path().join("pkg.whl"));
            assert_eq!(std::fs::read(&result.destination).unwrap(), b"payload");
        }

        #[tokio::test]
        async fn existing_partial_marks_resumable() {
            let tmp = TempDir::new().unwrap();
            std::fs::write(tmp.path().join("pkg.whl.part"), b"half").unwrap();
            let request = sh_request(script(&tmp, "exit 0\n"), "https://h/pkg.whl", tmp.path());

            let result = Aria2Transfer::with_executable("sh")
                .transfer(request)
                .await
                .unwrap();

            assert!(result.resumable);
        }
    }
}
