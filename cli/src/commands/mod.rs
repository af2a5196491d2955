//! Subcommand implementations.

pub mod config;
pub mod kill;
pub mod list;
pub mod ports;
pub mod scan;
pub mod watch;

use anyhow::{Context, Result};
use portsentinel_core::{ConfigStore, HostPlatform, HostPortService, PortScanService, PortService};

/// Build the service over the host OS tools and the user's saved configuration.
pub async fn open_service() -> Result<HostPortService> {
    let store = ConfigStore::new()?;
    let path = store.config_path().display().to_string();
    PortService::load(PortScanService::new(HostPlatform::new()), store)
        .await
        .with_context(|| format!("failed to load configuration from {}", path))
}

/// Shorten `s` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
