//! Port scan and process domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// PortStatus / Protocol
// ============================================================================

/// Observed state of a configured port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortStatus {
    /// Nothing is listening on the port.
    Free,
    /// A listening socket owns the port.
    InUse,
    /// Discovery failed, or the port has not been scanned yet.
    #[default]
    Unknown,
}

impl PortStatus {
    /// Get the display name for this status.
    pub fn display_name(&self) -> &'static str {
        match self {
            PortStatus::Free => "FREE",
            PortStatus::InUse => "IN_USE",
            PortStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for PortStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Transport protocol of a scanned socket. Only TCP is scanned today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Unknown,
}

// ============================================================================
// ListenerInfo / ProcessInfo
// ============================================================================

/// Owner of a listening socket as reported by a discovery tool.
///
/// Produced by the output parsers and consumed within a single scan batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListenerInfo {
    /// Owning process ID, 0 when the tool did not report one.
    pub pid: u32,
    /// Local address column exactly as printed by the tool.
    pub local_address: String,
}

impl ListenerInfo {
    pub fn new(pid: u32, local_address: impl Into<String>) -> Self {
        Self {
            pid,
            local_address: local_address.into(),
        }
    }
}

/// Human-readable identity of a process.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub pid: u32,
    pub process_name: String,
    pub command_line: String,
    pub exe_path: String,
}

impl ProcessInfo {
    /// Create an empty record for a PID, to be filled by attribution.
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            ..Default::default()
        }
    }
}

// ============================================================================
// PortScanResult
// ============================================================================

/// Outcome of scanning one port.
///
/// Exactly one [`PortStatus`] holds. `InUse` results carry whatever the
/// discovery tool reported (the PID may still be 0), `Unknown` results from a
/// failed discovery carry the failure in `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortScanResult {
    pub port: u16,
    pub status: PortStatus,
    pub protocol: Protocol,
    pub pid: u32,
    pub process_name: String,
    pub command_line: String,
    pub exe_path: String,
    pub local_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PortScanResult {
    /// A port with no listener.
    pub fn free(port: u16) -> Self {
        Self::with_status(port, PortStatus::Free)
    }

    /// A port whose state could not be determined.
    pub fn unknown(port: u16) -> Self {
        Self::with_status(port, PortStatus::Unknown)
    }

    fn with_status(port: u16, status: PortStatus) -> Self {
        Self {
            port,
            status,
            protocol: Protocol::Tcp,
            pid: 0,
            process_name: String::new(),
            command_line: String::new(),
            exe_path: String::new(),
            local_address: String::new(),
            error: None,
            updated_at: Utc::now(),
        }
    }

    /// Mark the port as owned by the given listener.
    pub fn mark_in_use(&mut self, listener: &ListenerInfo) {
        self.status = PortStatus::InUse;
        self.pid = listener.pid;
        self.local_address = listener.local_address.clone();
    }

    /// Copy process identity fields into the result.
    pub fn apply_process(&mut self, process: &ProcessInfo) {
        self.process_name = process.process_name.clone();
        self.command_line = process.command_line.clone();
        self.exe_path = process.exe_path.clone();
    }

    /// Whether a process currently owns the port.
    pub fn is_in_use(&self) -> bool {
        self.status == PortStatus::InUse
    }

    /// Command line if known, otherwise the executable path.
    pub fn command_or_exe(&self) -> &str {
        if self.command_line.is_empty() {
            &self.exe_path
        } else {
            &self.command_line
        }
    }
}

impl std::fmt::Display for PortScanResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            PortStatus::InUse => write!(
                f,
                "{} {} (PID: {}, Process: {})",
                self.port, self.status, self.pid, self.process_name
            ),
            _ => write!(f, "{} {}", self.port, self.status),
        }
    }
}
