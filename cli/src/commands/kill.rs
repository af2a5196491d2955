//! Kill command - terminate a process by PID.

use anyhow::{bail, Result};
use portsentinel_core::HostPortService;

/// `force` overrides the configured default when given.
pub async fn run(service: &HostPortService, pid: u32, force: Option<bool>) -> Result<()> {
    let force =
        force.unwrap_or_else(|| service.state().snapshot_config().ui.force_kill_enabled);

    if let Err(e) = service.kill_process(pid, force).await {
        if e.is_timeout() {
            bail!("Timed out waiting for the OS to terminate PID {}: {}", pid, e);
        }
        return Err(e.into());
    }

    let action = if force { "Force killed" } else { "Sent terminate signal to" };
    println!("✓ {} PID {}", action, pid);
    Ok(())
}
