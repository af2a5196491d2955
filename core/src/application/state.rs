//! Shared application state: configuration, effective ports and last results.

use std::collections::{BTreeSet, HashMap};

use parking_lot::Mutex;
use tracing::debug;

use crate::domain::{validate_port, Config, PortScanResult};
use crate::error::{Error, Result};

struct Inner {
    config: Config,
    ports: Vec<u16>,
    results: HashMap<u16, PortScanResult>,
}

impl Inner {
    fn recompute(&mut self) {
        self.ports = self.config.effective_ports();
    }
}

/// Configuration and scan results behind a single lock.
///
/// Constructed explicitly and shared through `Arc`. Every mutation of the
/// configuration recomputes the effective port list before the lock is
/// released, so readers never see the two out of step.
pub struct AppState {
    inner: Mutex<Inner>,
}

impl AppState {
    /// Create state from a loaded configuration with no results yet.
    pub fn new(config: Config) -> Self {
        let ports = config.effective_ports();
        Self {
            inner: Mutex::new(Inner {
                config,
                ports,
                results: HashMap::new(),
            }),
        }
    }

    /// The effective port list, pinned ports first.
    pub fn ports(&self) -> Vec<u16> {
        self.inner.lock().ports.clone()
    }

    /// Insert or replace the result for its port.
    pub fn set_result(&self, result: PortScanResult) {
        self.inner.lock().results.insert(result.port, result);
    }

    /// Insert or replace several results at once.
    ///
    /// Results for ports outside the effective list are kept, so that they
    /// reappear if the port is enabled again.
    pub fn set_results(&self, results: impl IntoIterator<Item = PortScanResult>) {
        let mut inner = self.inner.lock();
        for result in results {
            inner.results.insert(result.port, result);
        }
    }

    /// A copy of the current configuration.
    pub fn snapshot_config(&self) -> Config {
        self.inner.lock().config.clone()
    }

    /// Results for the effective port list, in its order.
    ///
    /// Ports that were never scanned get an UNKNOWN placeholder stamped now.
    pub fn snapshot_results(&self) -> Vec<PortScanResult> {
        let inner = self.inner.lock();
        inner
            .ports
            .iter()
            .map(|port| {
                inner
                    .results
                    .get(port)
                    .cloned()
                    .unwrap_or_else(|| PortScanResult::unknown(*port))
            })
            .collect()
    }

    /// Replace the whole configuration.
    pub fn update_config(&self, config: Config) {
        let mut inner = self.inner.lock();
        inner.config = config;
        inner.recompute();
    }

    /// Add a custom port.
    ///
    /// # Errors
    /// - [`Error::InvalidPort`] outside 1-65535
    /// - [`Error::DuplicatePort`] when it is already a custom port
    pub fn add_custom_port(&self, port: u32) -> Result<u16> {
        let port = validate_port(port)?;
        let mut inner = self.inner.lock();
        if inner.config.custom_ports.contains(&port) {
            return Err(Error::DuplicatePort(port));
        }
        inner.config.custom_ports.push(port);
        inner.recompute();
        debug!(port = port, "Custom port added");
        Ok(port)
    }

    /// Remove a custom port along with its pin.
    pub fn remove_custom_port(&self, port: u16) -> Result<()> {
        let mut inner = self.inner.lock();
        let Some(index) = inner.config.custom_ports.iter().position(|&p| p == port) else {
            return Err(Error::PortNotFound(port));
        };
        inner.config.custom_ports.remove(index);
        inner.config.pinned_ports.remove(&port);
        inner.recompute();
        debug!(port = port, "Custom port removed");
        Ok(())
    }

    /// Enable or disable a preset port. Disabling clears its pin.
    ///
    /// Ports that are not presets become presets.
    pub fn toggle_preset(&self, port: u16, enabled: bool) {
        let mut inner = self.inner.lock();
        inner.config.preset_ports.insert(port, enabled);
        if !enabled {
            inner.config.pinned_ports.remove(&port);
        }
        inner.recompute();
    }

    /// Set or clear the pin flag on a port.
    pub fn toggle_pin(&self, port: u16, pinned: bool) {
        let mut inner = self.inner.lock();
        if pinned {
            inner.config.pinned_ports.insert(port, true);
        } else {
            inner.config.pinned_ports.remove(&port);
        }
        inner.recompute();
    }

    pub fn is_pinned(&self, port: u16) -> bool {
        self.inner.lock().config.is_pinned(port)
    }

    /// Ports with the pin flag set.
    pub fn pinned_ports(&self) -> BTreeSet<u16> {
        self.inner.lock().config.pinned()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ListenerInfo, PortStatus, UiConfig};
    use std::collections::BTreeMap;

    fn small_config() -> Config {
        Config {
            preset_ports: BTreeMap::from([(80, true), (443, true)]),
            custom_ports: vec![22],
            pinned_ports: BTreeMap::from([(443, true)]),
            ui: UiConfig::default(),
        }
    }

    #[test]
    fn test_initial_ports_are_ordered() {
        let state = AppState::new(small_config());
        assert_eq!(state.ports(), vec![443, 22, 80]);
    }

    #[test]
    fn test_add_then_remove_restores_state() {
        let state = AppState::new(small_config());
        let ports_before = state.ports();
        let pinned_before = state.pinned_ports();

        assert_eq!(state.add_custom_port(9000).unwrap(), 9000);
        state.toggle_pin(9000, true);
        assert_eq!(state.ports(), vec![443, 9000, 22, 80]);

        state.remove_custom_port(9000).unwrap();
        assert_eq!(state.ports(), ports_before);
        assert_eq!(state.pinned_ports(), pinned_before);
    }

    #[test]
    fn test_rejected_adds_leave_state_unchanged() {
        let state = AppState::new(small_config());
        let before = state.snapshot_config();

        assert!(matches!(state.add_custom_port(22), Err(Error::DuplicatePort(22))));
        assert!(matches!(state.add_custom_port(0), Err(Error::InvalidPort(0))));
        assert!(matches!(
            state.add_custom_port(70000),
            Err(Error::InvalidPort(70000))
        ));

        assert_eq!(state.snapshot_config(), before);
        assert_eq!(state.ports(), vec![443, 22, 80]);
    }

    #[test]
    fn test_remove_missing_custom_port() {
        let state = AppState::new(small_config());
        assert!(matches!(
            state.remove_custom_port(80),
            Err(Error::PortNotFound(80))
        ));
    }

    #[test]
    fn test_disabling_preset_clears_pin() {
        let state = AppState::new(small_config());
        state.toggle_preset(443, false);

        assert!(!state.is_pinned(443));
        assert_eq!(state.ports(), vec![22, 80]);

        state.toggle_preset(443, true);
        assert_eq!(state.ports(), vec![22, 80, 443]);
    }

    #[test]
    fn test_snapshot_results_fill_unknown() {
        let state = AppState::new(small_config());

        let mut in_use = PortScanResult::free(80);
        in_use.mark_in_use(&ListenerInfo::new(10, "*:80"));
        state.set_results(vec![in_use, PortScanResult::free(22)]);

        let snapshot = state.snapshot_results();
        let statuses: Vec<_> = snapshot.iter().map(|r| (r.port, r.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (443, PortStatus::Unknown),
                (22, PortStatus::Free),
                (80, PortStatus::InUse),
            ]
        );
    }

    #[test]
    fn test_results_survive_reconfiguration() {
        let state = AppState::new(small_config());
        state.set_result(PortScanResult::free(80));

        state.toggle_preset(80, false);
        assert!(state.snapshot_results().iter().all(|r| r.port != 80));

        state.toggle_preset(80, true);
        let result = state
            .snapshot_results()
            .into_iter()
            .find(|r| r.port == 80)
            .unwrap();
        assert_eq!(result.status, PortStatus::Free);
    }

    #[test]
    fn test_update_config_recomputes_ports() {
        let state = AppState::default();
        assert_eq!(state.ports().len(), crate::domain::DEFAULT_PRESET_PORTS.len());

        state.update_config(small_config());
        assert_eq!(state.ports(), vec![443, 22, 80]);
    }
}
