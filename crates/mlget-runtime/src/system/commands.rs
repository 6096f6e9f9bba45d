//! Running short-lived probe commands.

use std::path::Path;
use std::process::Command;

/// Run `program` with `args` and return stdout followed by stderr.
///
/// `None` when the program cannot be started or exits nonzero.
pub fn combined_output(program: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;

    if !output.status.success() {
        tracing::debug!(
            program = %program.display(),
            status = ?output.status.code(),
            "Probe command exited with failure"
        );
        return None;
    }

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    Some(text)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn joins_both_streams() {
        let out = combined_output(Path::new("sh"), &["-c", "echo out; echo err >&2"]).unwrap();
        assert!(out.contains("out"));
        assert!(out.contains("err"));
    }

    #[test]
    fn nonzero_exit_is_none() {
        assert!(combined_output(Path::new("sh"), &["-c", "exit 3"]).is_none());
    }

    #[test]
    fn missing_program_is_none() {
        assert!(combined_output(Path::new("/nonexistent/mlget-probe"), &[]).is_none());
    }
}
