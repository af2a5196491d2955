//! Port scanner port (interface).

use crate::domain::PortScanResult;
use crate::error::{Error, Result};

/// Results of one scan batch.
///
/// `error` is the batch-level discovery failure, if any. The results are still
/// usable when it is set: ports that were not found are reported as
/// [`PortStatus::Unknown`](crate::domain::PortStatus::Unknown).
#[derive(Debug, Default)]
pub struct ScanReport {
    pub results: Vec<PortScanResult>,
    pub error: Option<Error>,
}

impl ScanReport {
    /// Whether discovery succeeded for the whole batch.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Port for scanning configured ports and terminating their owners.
///
/// This is the seam the application service depends on, so that it can be
/// exercised without spawning real tools.
pub trait PortScannerPort: Send + Sync {
    /// Scan the given ports in one batch, preserving their order.
    fn scan_ports(&self, ports: &[u16]) -> impl std::future::Future<Output = ScanReport> + Send;

    /// Scan a single port; a discovery failure is returned as the error.
    fn scan_port(
        &self,
        port: u16,
    ) -> impl std::future::Future<Output = Result<PortScanResult>> + Send;

    /// Terminate a process by PID.
    fn kill_pid(&self, pid: u32, force: bool)
        -> impl std::future::Future<Output = Result<()>> + Send;
}
