//! Windows implementation using netstat, tasklist, wmic and taskkill.
//!
//! Unlike Unix there is no fallback discovery tool: when `netstat` fails the
//! whole batch is reported as failed.

use std::time::Duration;

use tracing::{debug, warn};

use crate::adapters::exec::{CommandRunner, SystemRunner};
use crate::domain::ProcessInfo;
use crate::error::{Error, Result};
use crate::ports::{Discovery, ProcessPlatform};

use super::parse::{apply_wmic_list, parse_tasklist_name, parse_windows_netstat};

const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);
const TASKLIST_TIMEOUT: Duration = Duration::from_secs(5);
const WMIC_TIMEOUT: Duration = Duration::from_secs(6);
const TASKKILL_TIMEOUT: Duration = Duration::from_secs(8);

/// Windows-specific platform strategy.
#[derive(Debug, Default)]
pub struct WindowsPlatform<R = SystemRunner> {
    runner: R,
}

impl WindowsPlatform {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl<R: CommandRunner> WindowsPlatform<R> {
    /// Create a strategy that runs its tools through `runner`.
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> ProcessPlatform for WindowsPlatform<R> {
    /// Executes: `netstat -ano -p tcp`
    async fn discover_listeners(&self) -> Discovery {
        match self
            .runner
            .run(DISCOVERY_TIMEOUT, "netstat", &["-ano", "-p", "tcp"])
            .await
        {
            Ok(output) => Discovery::found(parse_windows_netstat(&output.cleaned())),
            Err(e) => {
                warn!(error = %e, "netstat failed");
                Discovery::failed(e)
            }
        }
    }

    /// `tasklist` for the image name, `wmic` for command line and path.
    ///
    /// Only a `tasklist` failure fails the lookup; `wmic` is missing on
    /// recent Windows builds and is treated as optional.
    async fn attribute_process(&self, pid: u32) -> Result<ProcessInfo> {
        if pid == 0 {
            return Err(Error::InvalidPid(pid));
        }
        let mut info = ProcessInfo::new(pid);

        let filter = format!("PID eq {}", pid);
        let tasklist = self
            .runner
            .run(
                TASKLIST_TIMEOUT,
                "tasklist",
                &["/FI", filter.as_str(), "/FO", "CSV", "/NH"],
            )
            .await?;
        if let Some(name) = parse_tasklist_name(&tasklist.cleaned()) {
            info.process_name = name;
        }

        let condition = format!("processid={}", pid);
        match self
            .runner
            .run(
                WMIC_TIMEOUT,
                "wmic",
                &[
                    "process",
                    "where",
                    condition.as_str(),
                    "get",
                    "CommandLine,ExecutablePath",
                    "/FORMAT:LIST",
                ],
            )
            .await
        {
            Ok(output) => apply_wmic_list(&output.cleaned(), &mut info),
            Err(e) => debug!(pid = pid, error = %e, "wmic lookup failed"),
        }

        Ok(info)
    }

    /// Executes: `taskkill /PID <pid>`, adding `/T /F` when forced.
    async fn terminate(&self, pid: u32, force: bool) -> Result<()> {
        if pid == 0 {
            return Err(Error::InvalidPid(pid));
        }
        let pid_arg = pid.to_string();
        let mut args = vec!["/PID", pid_arg.as_str()];
        if force {
            args.extend(["/T", "/F"]);
        }

        debug!(pid = pid, force = force, "Executing taskkill");
        self.runner.run(TASKKILL_TIMEOUT, "taskkill", &args).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::exec::scripted::ScriptedRunner;

    const NETSTAT: &str = "netstat -ano -p tcp";

    #[tokio::test]
    async fn test_discovery_has_no_fallback() {
        let platform = WindowsPlatform::with_runner(ScriptedRunner::new().fail(NETSTAT, "denied"));

        let discovery = platform.discover_listeners().await;
        assert!(discovery.listeners.is_empty());
        assert!(discovery.error.is_some());
        assert_eq!(platform.runner.calls(), vec![NETSTAT.to_string()]);
    }

    #[tokio::test]
    async fn test_attribution_tolerates_missing_wmic() {
        let runner = ScriptedRunner::new().ok(
            "tasklist /FI PID eq 4242 /FO CSV /NH",
            "\"node.exe\",\"4242\",\"Console\",\"1\",\"52,340 K\"\r\n",
        );
        let platform = WindowsPlatform::with_runner(runner);

        let info = platform.attribute_process(4242).await.unwrap();
        assert_eq!(info.process_name, "node.exe");
        assert!(info.command_line.is_empty());
    }

    #[tokio::test]
    async fn test_tasklist_failure_fails_attribution() {
        let platform = WindowsPlatform::with_runner(ScriptedRunner::new());
        assert!(platform.attribute_process(4242).await.is_err());
    }

    #[tokio::test]
    async fn test_force_adds_tree_and_force_flags() {
        let runner = ScriptedRunner::new()
            .ok("taskkill /PID 7", "")
            .ok("taskkill /PID 7 /T /F", "");
        let platform = WindowsPlatform::with_runner(runner);

        platform.terminate(7, false).await.unwrap();
        platform.terminate(7, true).await.unwrap();
        assert_eq!(
            platform.runner.calls(),
            vec!["taskkill /PID 7".to_string(), "taskkill /PID 7 /T /F".to_string()]
        );
    }
}
