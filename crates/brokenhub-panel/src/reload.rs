//! Signals the brokenhub daemon to re-read its config file.
//!
//! The control command is a fixed executable path invoked with the literal
//! argument `reload`. Nothing from a request ever reaches its command line.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use crate::error::PanelError;

/// Argument passed to the control command.
pub const RELOAD_ARG: &str = "reload";

/// Runs the daemon's control command.
#[derive(Debug, Clone)]
pub struct ReloadTrigger {
    command: PathBuf,
    timeout: Option<Duration>,
}

/// Captured result of a successful reload.
#[derive(Debug, Clone)]
pub struct ReloadOutcome {
    pub output: String,
}

impl ReloadTrigger {
    /// Build a trigger for `command`. With `timeout` set, a command still
    /// running after that long is killed and reported as a failure.
    pub fn new(command: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    /// Run `<command> reload` and wait for it to exit.
    pub async fn reload(&self) -> Result<ReloadOutcome, PanelError> {
        let mut cmd = tokio::process::Command::new(&self.command);
        cmd.arg(RELOAD_ARG)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let run = cmd.output();
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(PanelError::ReloadFailed {
                        status: None,
                        output: format!(
                            "{} {RELOAD_ARG} timed out after {limit:?}",
                            self.command.display()
                        ),
                    });
                }
            },
            None => run.await,
        };

        let output = result.map_err(|e| PanelError::ReloadFailed {
            status: None,
            output: format!("cannot run {}: {e}", self.command.display()),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = if stderr.is_empty() {
            stdout.trim_end().to_string()
        } else {
            format!("{}\n{}", stdout.trim_end(), stderr.trim_end())
                .trim()
                .to_string()
        };

        if !output.status.success() {
            return Err(PanelError::ReloadFailed {
                status: output.status.code(),
                output: combined,
            });
        }

        tracing::info!(command = %self.command.display(), "daemon reloaded");
        Ok(ReloadOutcome { output: combined })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{scratch_dir, write_script};

    #[tokio::test]
    async fn reload_passes_literal_argument() {
        let dir = scratch_dir();
        let calls = dir.join("calls");
        let script = write_script(
            &dir,
            "ctl",
            &format!("echo \"$@\" >> '{}'\necho reloaded", calls.display()),
        );

        let outcome = ReloadTrigger::new(&script, None).reload().await.unwrap();

        assert_eq!(outcome.output, "reloaded");
        assert_eq!(std::fs::read_to_string(&calls).unwrap(), "reload\n");
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported_with_output() {
        let dir = scratch_dir();
        let script = write_script(&dir, "ctl", "echo 'brokenhub is not running' >&2\nexit 3");

        let err = ReloadTrigger::new(&script, None).reload().await.unwrap_err();

        match err {
            PanelError::ReloadFailed { status, output } => {
                assert_eq!(status, Some(3));
                assert!(output.contains("brokenhub is not running"), "{output}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_command_is_reported() {
        let dir = scratch_dir();
        let err = ReloadTrigger::new(dir.join("no-such-ctl"), None)
            .reload()
            .await
            .unwrap_err();

        match err {
            PanelError::ReloadFailed { status, output } => {
                assert_eq!(status, None);
                assert!(output.contains("cannot run"), "{output}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn timeout_expiry_is_a_failure() {
        let dir = scratch_dir();
        let script = write_script(&dir, "ctl", "sleep 5");

        let err = ReloadTrigger::new(&script, Some(Duration::from_millis(100)))
            .reload()
            .await
            .unwrap_err();

        match err {
            PanelError::ReloadFailed { status, output } => {
                assert_eq!(status, None);
                assert!(output.contains("timed out"), "{output}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn fast_command_within_timeout_succeeds() {
        let dir = scratch_dir();
        let script = write_script(&dir, "ctl", "exit 0");

        let outcome = ReloadTrigger::new(&script, Some(Duration::from_secs(10)))
            .reload()
            .await
            .unwrap();
        assert_eq!(outcome.output, "");
    }
}
