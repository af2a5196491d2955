//! Bounded subprocess execution.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Captured output of a subprocess that exited successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout with line endings normalized and surrounding whitespace trimmed.
    pub fn cleaned(&self) -> String {
        clean_output(&self.stdout)
    }
}

/// Run `program` with `args`, killing it if it outlives `limit`.
///
/// The child is spawned with `kill_on_drop`, so when the deadline fires and
/// the pending future is dropped the process is killed instead of leaked.
///
/// # Errors
/// - [`Error::CommandTimeout`] when the deadline is exceeded
/// - [`Error::CommandFailed`] when the program cannot start or exits non-zero
pub async fn run_command<I, S>(limit: Duration, program: &str, args: I) -> Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    debug!(program = program, timeout_ms = limit.as_millis() as u64, "Running command");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match timeout(limit, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            debug!(program = program, error = %e, "Failed to start command");
            return Err(Error::CommandFailed {
                program: program.to_string(),
                reason: e.to_string(),
            });
        }
        Err(_) => {
            warn!(program = program, timeout_ms = limit.as_millis() as u64, "Command timed out");
            return Err(Error::CommandTimeout {
                program: program.to_string(),
                timeout: limit,
            });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        let detail = stderr.trim();
        let reason = if detail.is_empty() {
            output.status.to_string()
        } else {
            format!("{}: {}", output.status, detail)
        };
        debug!(program = program, reason = %reason, "Command exited unsuccessfully");
        return Err(Error::CommandFailed {
            program: program.to_string(),
            reason,
        });
    }

    Ok(CommandOutput { stdout, stderr })
}

/// Runs external programs on behalf of a platform strategy.
///
/// Strategies own a runner so that tests can script tool output without
/// spawning anything.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        limit: Duration,
        program: &str,
        args: &[&str],
    ) -> impl std::future::Future<Output = Result<CommandOutput>> + Send;
}

/// Runner that spawns real processes through [`run_command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, limit: Duration, program: &str, args: &[&str]) -> Result<CommandOutput> {
        run_command(limit, program, args).await
    }
}

/// Normalize CRLF line endings and trim surrounding whitespace.
pub fn clean_output(s: &str) -> String {
    s.replace("\r\n", "\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_output() {
        assert_eq!(clean_output("  a\r\nb\r\n\r\n"), "a\nb");
        assert_eq!(clean_output("   "), "");
    }

    #[tokio::test]
    async fn test_missing_program_is_command_failure() {
        let err = run_command(
            Duration::from_secs(2),
            "portsentinel-definitely-not-a-real-binary",
            ["--version"],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
        assert!(!err.is_timeout());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_spawns_program() {
        let output = SystemRunner
            .run(Duration::from_secs(5), "sh", &["-c", "echo runner"])
            .await
            .unwrap();
        assert_eq!(output.cleaned(), "runner");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stdout() {
        let output = run_command(Duration::from_secs(5), "sh", ["-c", "printf 'hello\\r\\n'"])
            .await
            .unwrap();
        assert_eq!(output.cleaned(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_reports_stderr() {
        let err = run_command(Duration::from_secs(5), "sh", ["-c", "echo oops >&2; exit 3"])
            .await
            .unwrap_err();
        match err {
            Error::CommandFailed { program, reason } => {
                assert_eq!(program, "sh");
                assert!(reason.contains("oops"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_is_reported_distinctly() {
        let started = std::time::Instant::now();
        let err = run_command(Duration::from_millis(100), "sleep", ["5"])
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}

/// A [`CommandRunner`] answering from a script instead of spawning programs.
#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::HashMap;
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::{CommandOutput, CommandRunner};
    use crate::error::{Error, Result};

    /// Responses are keyed by the full command line, e.g. `ps -p 42 -o comm=`.
    /// Unscripted commands fail as if the program were missing.
    #[derive(Default)]
    pub(crate) struct ScriptedRunner {
        responses: HashMap<String, std::result::Result<String, String>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn ok(mut self, command_line: &str, stdout: &str) -> Self {
            self.responses
                .insert(command_line.to_string(), Ok(stdout.to_string()));
            self
        }

        pub(crate) fn fail(mut self, command_line: &str, reason: &str) -> Self {
            self.responses
                .insert(command_line.to_string(), Err(reason.to_string()));
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    impl CommandRunner for ScriptedRunner {
        async fn run(&self, _limit: Duration, program: &str, args: &[&str]) -> Result<CommandOutput> {
            let line = std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            self.calls.lock().push(line.clone());

            match self.responses.get(&line) {
                Some(Ok(stdout)) => Ok(CommandOutput {
                    stdout: stdout.clone(),
                    stderr: String::new(),
                }),
                Some(Err(reason)) => Err(Error::CommandFailed {
                    program: program.to_string(),
                    reason: reason.clone(),
                }),
                None => Err(Error::CommandFailed {
                    program: program.to_string(),
                    reason: "No such file or directory (os error 2)".to_string(),
                }),
            }
        }
    }
}
