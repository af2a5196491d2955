//! User configuration model and the effective port ordering.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Well-known development ports enabled out of the box.
pub const DEFAULT_PRESET_PORTS: [u16; 14] = [
    3000, 5173, 8080, 8000, 5000, 4200, 5432, 6379, 27017, 9229, 15672, 5672, 3306, 11211,
];

/// Default auto-refresh interval in milliseconds.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 5000;

/// Preset port table with every default port enabled.
pub fn default_preset_ports() -> BTreeMap<u16, bool> {
    DEFAULT_PRESET_PORTS.iter().map(|&port| (port, true)).collect()
}

fn default_refresh_interval_ms() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

/// Validate a raw port number and narrow it to `u16`.
pub fn validate_port(port: u32) -> Result<u16> {
    match u16::try_from(port) {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(Error::InvalidPort(port)),
    }
}

/// Presentation preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    #[serde(default)]
    pub auto_refresh_enabled: bool,

    #[serde(default = "default_refresh_interval_ms")]
    pub auto_refresh_interval_ms: u64,

    #[serde(default)]
    pub force_kill_enabled: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            auto_refresh_enabled: false,
            auto_refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            force_kill_enabled: false,
        }
    }
}

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Preset ports and whether each one is enabled.
    #[serde(default = "default_preset_ports")]
    pub preset_ports: BTreeMap<u16, bool>,

    /// User-added ports in insertion order, without duplicates.
    #[serde(default)]
    pub custom_ports: Vec<u16>,

    /// Pin flags. A pin only takes effect while its port is enabled.
    #[serde(default)]
    pub pinned_ports: BTreeMap<u16, bool>,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preset_ports: default_preset_ports(),
            custom_ports: Vec::new(),
            pinned_ports: BTreeMap::new(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Repair values that older or hand-edited files may carry.
    pub fn normalize(&mut self) {
        if self.ui.auto_refresh_interval_ms == 0 {
            self.ui.auto_refresh_interval_ms = DEFAULT_REFRESH_INTERVAL_MS;
        }
        let mut seen = BTreeSet::new();
        self.custom_ports.retain(|p| *p > 0 && seen.insert(*p));
    }

    /// Whether `port` is flagged as pinned.
    pub fn is_pinned(&self, port: u16) -> bool {
        self.pinned_ports.get(&port).copied().unwrap_or(false)
    }

    /// Ports with a pin flag set, regardless of membership.
    pub fn pinned(&self) -> BTreeSet<u16> {
        self.pinned_ports
            .iter()
            .filter(|&(_, &pinned)| pinned)
            .map(|(&port, _)| port)
            .collect()
    }

    /// Enabled presets together with all custom ports.
    pub fn enabled_ports(&self) -> BTreeSet<u16> {
        self.preset_ports
            .iter()
            .filter(|&(_, &enabled)| enabled)
            .map(|(&port, _)| port)
            .chain(self.custom_ports.iter().copied())
            .collect()
    }

    /// Ports to display, pinned ones first.
    ///
    /// Pinned-and-enabled ports ascending, followed by the remaining enabled
    /// ports ascending. Every port appears once.
    pub fn effective_ports(&self) -> Vec<u16> {
        let (pinned, rest): (Vec<u16>, Vec<u16>) = self
            .enabled_ports()
            .into_iter()
            .partition(|port| self.is_pinned(*port));

        pinned.into_iter().chain(rest).collect()
    }
}
