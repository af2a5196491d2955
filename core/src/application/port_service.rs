//! Port monitoring application service.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{Config, PortScanResult};
use crate::error::{Error, Result};
use crate::ports::{ConfigRepository, PortScannerPort, ScanReport};

use super::AppState;

/// Application service for scanning, killing and configuring ports.
///
/// This service binds the shared [`AppState`] to a scanner and a
/// configuration repository. It uses the `PortScannerPort` and
/// `ConfigRepository` traits, allowing different implementations to be
/// injected.
pub struct PortService<S: PortScannerPort, R: ConfigRepository> {
    state: Arc<AppState>,
    scanner: S,
    repo: R,
}

impl<S: PortScannerPort, R: ConfigRepository> PortService<S, R> {
    /// Create a new port service over existing state.
    pub fn new(state: Arc<AppState>, scanner: S, repo: R) -> Self {
        Self {
            state,
            scanner,
            repo,
        }
    }

    /// Load configuration from the repository and build fresh state from it.
    pub async fn load(scanner: S, repo: R) -> Result<Self> {
        let config = repo.load().await?;
        Ok(Self::new(Arc::new(AppState::new(config)), scanner, repo))
    }

    /// The shared state.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Scan every effective port and store the results.
    ///
    /// Results are stored even when discovery failed; the batch error is
    /// returned in the report.
    pub async fn refresh_all(&self) -> ScanReport {
        let ports = self.state.ports();
        let report = self.scanner.scan_ports(&ports).await;
        if let Some(e) = &report.error {
            warn!(error = %e, "Port discovery failed");
        }
        self.state.set_results(report.results.iter().cloned());
        report
    }

    /// Scan a single port; the state is only updated on success.
    pub async fn refresh_one(&self, port: u16) -> Result<PortScanResult> {
        let result = self.scanner.scan_port(port).await?;
        self.state.set_result(result.clone());
        Ok(result)
    }

    /// Terminate a process, refusing to terminate this one.
    pub async fn kill_process(&self, pid: u32, force: bool) -> Result<()> {
        if pid == std::process::id() {
            return Err(Error::SelfTermination(pid));
        }
        info!(pid = pid, force = force, "Killing process");
        self.scanner.kill_pid(pid, force).await
    }

    /// Persist the current configuration.
    pub async fn save_config(&self) -> Result<()> {
        self.repo.save(&self.state.snapshot_config()).await
    }

    /// Apply `mutate` to a copy of the configuration, install and persist it.
    pub async fn update_config<F>(&self, mutate: F) -> Result<Config>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.state.snapshot_config();
        mutate(&mut config);
        config.normalize();
        self.state.update_config(config.clone());
        self.repo.save(&config).await?;
        Ok(config)
    }

    pub async fn add_custom_port_and_save(&self, port: u32) -> Result<u16> {
        let port = self.state.add_custom_port(port)?;
        self.save_config().await?;
        Ok(port)
    }

    pub async fn remove_custom_port_and_save(&self, port: u16) -> Result<()> {
        self.state.remove_custom_port(port)?;
        self.save_config().await
    }

    pub async fn toggle_preset_and_save(&self, port: u16, enabled: bool) -> Result<()> {
        self.state.toggle_preset(port, enabled);
        debug!(port = port, enabled = enabled, "Preset toggled");
        self.save_config().await
    }

    pub async fn toggle_pin_and_save(&self, port: u16, pinned: bool) -> Result<()> {
        self.state.toggle_pin(port, pinned);
        debug!(port = port, pinned = pinned, "Pin toggled");
        self.save_config().await
    }
}
