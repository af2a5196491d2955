//! Unix (Linux, macOS, BSD) implementation using lsof, netstat, ps and kill.
//!
//! Discovery tries `lsof` first and falls back to `netstat -lntp`, since
//! minimal Linux images frequently ship only one of the two.

use std::time::Duration;

use nix::sys::signal::Signal;
use tracing::{debug, warn};

use crate::adapters::exec::{CommandOutput, CommandRunner, SystemRunner};
use crate::domain::ProcessInfo;
use crate::error::{Error, Result};
use crate::ports::{Discovery, ProcessPlatform};

use super::parse::{parse_lsof, parse_unix_netstat};

const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);
const PS_TIMEOUT: Duration = Duration::from_secs(4);
const KILL_TIMEOUT: Duration = Duration::from_secs(5);

/// Unix-specific platform strategy.
#[derive(Debug, Default)]
pub struct UnixPlatform<R = SystemRunner> {
    runner: R,
}

impl UnixPlatform {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl<R: CommandRunner> UnixPlatform<R> {
    /// Create a strategy that runs its tools through `runner`.
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    /// Fill command line, executable path and name from `/proc`.
    ///
    /// Missing entries (kernel threads, other users' processes) are skipped.
    #[cfg(target_os = "linux")]
    async fn read_proc(&self, pid: u32, info: &mut ProcessInfo) {
        let proc_dir = std::path::PathBuf::from("/proc").join(pid.to_string());

        if let Ok(data) = tokio::fs::read(proc_dir.join("cmdline")).await {
            info.command_line = join_cmdline(&data);
        }

        if let Ok(exe) = tokio::fs::read_link(proc_dir.join("exe")).await {
            if let Some(name) = exe.file_name() {
                info.process_name = name.to_string_lossy().into_owned();
            }
            info.exe_path = exe.to_string_lossy().into_owned();
        }
    }
}

impl<R: CommandRunner> ProcessPlatform for UnixPlatform<R> {
    /// Executes: `lsof -nP -iTCP -sTCP:LISTEN`, then `netstat -lntp`.
    ///
    /// Flags explained:
    /// - -n: Show IP addresses (don't resolve to hostnames)
    /// - -P: Show port numbers (don't resolve to service names)
    /// - -iTCP -sTCP:LISTEN: Only listening TCP sockets
    async fn discover_listeners(&self) -> Discovery {
        let lsof_err = match self
            .runner
            .run(DISCOVERY_TIMEOUT, "lsof", &["-nP", "-iTCP", "-sTCP:LISTEN"])
            .await
        {
            Ok(output) => return Discovery::found(parse_lsof(&output.cleaned())),
            Err(e) => e,
        };
        debug!(error = %lsof_err, "lsof failed, falling back to netstat");

        match self.runner.run(DISCOVERY_TIMEOUT, "netstat", &["-lntp"]).await {
            Ok(output) => Discovery::found(parse_unix_netstat(&output.cleaned())),
            Err(netstat_err) => {
                warn!(lsof = %lsof_err, netstat = %netstat_err, "All discovery tools failed");
                Discovery::failed(Error::Discovery(format!(
                    "lsof error: {}; netstat error: {}",
                    lsof_err, netstat_err
                )))
            }
        }
    }

    /// `/proc` where available, then `ps`, which wins when it answers.
    async fn attribute_process(&self, pid: u32) -> Result<ProcessInfo> {
        if pid == 0 {
            return Err(Error::InvalidPid(pid));
        }
        let mut info = ProcessInfo::new(pid);

        #[cfg(target_os = "linux")]
        self.read_proc(pid, &mut info).await;

        let pid_arg = pid.to_string();

        let comm = self
            .runner
            .run(PS_TIMEOUT, "ps", &["-p", pid_arg.as_str(), "-o", "comm="])
            .await;
        override_if_present(&mut info.process_name, comm, pid, "comm");

        let command = self
            .runner
            .run(PS_TIMEOUT, "ps", &["-p", pid_arg.as_str(), "-o", "command="])
            .await;
        override_if_present(&mut info.command_line, command, pid, "command");

        Ok(info)
    }

    /// Executes: `kill -15 <pid>` or `kill -9 <pid>`.
    async fn terminate(&self, pid: u32, force: bool) -> Result<()> {
        if pid == 0 {
            return Err(Error::InvalidPid(pid));
        }
        let signal = if force { Signal::SIGKILL } else { Signal::SIGTERM };
        let signal_arg = format!("-{}", signal as i32);
        let pid_arg = pid.to_string();

        debug!(pid = pid, signal = ?signal, "Sending signal to process");
        self.runner
            .run(KILL_TIMEOUT, "kill", &[signal_arg.as_str(), pid_arg.as_str()])
            .await?;
        Ok(())
    }
}

/// `/proc/<pid>/cmdline` arguments are NUL-separated.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn join_cmdline(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .split('\0')
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Replace `field` with non-empty `ps` output.
///
/// A failed lookup or empty output keeps the value read from `/proc`.
fn override_if_present(field: &mut String, lookup: Result<CommandOutput>, pid: u32, column: &str) {
    match lookup {
        Ok(output) => {
            let value = output.cleaned();
            if !value.is_empty() {
                *field = value;
            }
        }
        Err(e) => debug!(pid = pid, column = column, error = %e, "ps lookup failed"),
    }
}
