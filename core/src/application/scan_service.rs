//! Scan orchestration on top of a platform strategy.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{PortScanResult, ProcessInfo};
use crate::error::{Error, Result};
use crate::ports::{PortScannerPort, ProcessPlatform, ScanReport};

/// Turns one discovery pass into per-port results.
///
/// Every requested port starts out FREE. Ports found by discovery become
/// IN_USE and are attributed; when discovery failed, ports it did not find
/// are reported as UNKNOWN with the failure attached.
pub struct PortScanService<P: ProcessPlatform> {
    platform: P,
}

impl<P: ProcessPlatform> PortScanService<P> {
    /// Create a scan service over the given platform strategy.
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    /// Access the underlying platform strategy.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    async fn scan_batch(&self, ports: &[u16]) -> ScanReport {
        let discovery = self.platform.discover_listeners().await;
        let discovery_error = discovery.error.as_ref().map(|e| e.to_string());

        // Attribution outcomes for this batch only, keyed by PID.
        let mut attributed: HashMap<u32, std::result::Result<ProcessInfo, String>> =
            HashMap::new();
        let mut results = Vec::with_capacity(ports.len());

        for &port in ports {
            let mut result = PortScanResult::free(port);

            match discovery.listeners.get(&port) {
                Some(listener) => {
                    result.mark_in_use(listener);
                    if listener.pid > 0 {
                        if !attributed.contains_key(&listener.pid) {
                            let outcome = self
                                .platform
                                .attribute_process(listener.pid)
                                .await
                                .map_err(|e| e.to_string());
                            attributed.insert(listener.pid, outcome);
                        }
                        match &attributed[&listener.pid] {
                            Ok(info) => result.apply_process(info),
                            Err(e) => result.error = Some(e.clone()),
                        }
                    }
                }
                None => {
                    if let Some(error) = &discovery_error {
                        result = PortScanResult::unknown(port);
                        result.error = Some(error.clone());
                    }
                }
            }

            results.push(result);
        }

        debug!(
            requested = ports.len(),
            listeners = discovery.listeners.len(),
            attributed = attributed.len(),
            "Scan batch complete"
        );

        ScanReport {
            results,
            error: discovery.error,
        }
    }
}

impl<P: ProcessPlatform> PortScannerPort for PortScanService<P> {
    async fn scan_ports(&self, ports: &[u16]) -> ScanReport {
        self.scan_batch(ports).await
    }

    async fn scan_port(&self, port: u16) -> Result<PortScanResult> {
        let report = self.scan_batch(&[port]).await;
        if let Some(error) = report.error {
            return Err(error);
        }
        report
            .results
            .into_iter()
            .next()
            .ok_or_else(|| Error::Discovery(format!("no result for port {}", port)))
    }

    async fn kill_pid(&self, pid: u32, force: bool) -> Result<()> {
        if pid == 0 {
            return Err(Error::InvalidPid(pid));
        }
        self.platform.terminate(pid, force).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ListenerInfo, PortStatus};
    use crate::ports::Discovery;
    use parking_lot::Mutex;
    use tokio_test::{assert_err, assert_ok};

    /// Scripted platform recording every call it receives.
    #[derive(Default)]
    struct FakePlatform {
        listeners: HashMap<u16, ListenerInfo>,
        discovery_error: Option<String>,
        failing_pids: Vec<u32>,
        attributed: Mutex<Vec<u32>>,
        terminated: Mutex<Vec<(u32, bool)>>,
    }

    impl FakePlatform {
        fn with_listeners(listeners: &[(u16, u32)]) -> Self {
            Self {
                listeners: listeners
                    .iter()
                    .map(|&(port, pid)| (port, ListenerInfo::new(pid, format!("*:{}", port))))
                    .collect(),
                ..Default::default()
            }
        }
    }

    impl ProcessPlatform for FakePlatform {
        async fn discover_listeners(&self) -> Discovery {
            Discovery {
                listeners: self.listeners.clone(),
                error: self.discovery_error.clone().map(Error::Discovery),
            }
        }

        async fn attribute_process(&self, pid: u32) -> Result<ProcessInfo> {
            self.attributed.lock().push(pid);
            if self.failing_pids.contains(&pid) {
                return Err(Error::CommandFailed {
                    program: "ps".to_string(),
                    reason: "no such process".to_string(),
                });
            }
            let mut info = ProcessInfo::new(pid);
            info.process_name = format!("proc-{}", pid);
            info.command_line = format!("proc-{} --serve", pid);
            Ok(info)
        }

        async fn terminate(&self, pid: u32, force: bool) -> Result<()> {
            self.terminated.lock().push((pid, force));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_scan_marks_free_and_in_use_in_requested_order() {
        let service = PortScanService::new(FakePlatform::with_listeners(&[(3000, 42)]));

        let report = service.scan_ports(&[8080, 3000]).await;
        assert!(report.is_complete());
        assert_eq!(report.results.len(), 2);

        assert_eq!(report.results[0].port, 8080);
        assert_eq!(report.results[0].status, PortStatus::Free);

        let in_use = &report.results[1];
        assert_eq!(in_use.status, PortStatus::InUse);
        assert_eq!(in_use.pid, 42);
        assert_eq!(in_use.local_address, "*:3000");
        assert_eq!(in_use.process_name, "proc-42");
        assert!(in_use.error.is_none());
    }

    #[tokio::test]
    async fn test_attribution_runs_once_per_pid() {
        let service =
            PortScanService::new(FakePlatform::with_listeners(&[(3000, 7), (3001, 7), (4000, 8)]));

        let report = service.scan_ports(&[3000, 3001, 4000]).await;
        assert!(report.results.iter().all(|r| r.is_in_use()));

        let mut calls = service.platform().attributed.lock().clone();
        calls.sort_unstable();
        assert_eq!(calls, vec![7, 8]);
    }

    #[tokio::test]
    async fn test_zero_pid_is_not_attributed() {
        let service = PortScanService::new(FakePlatform::with_listeners(&[(631, 0)]));

        let report = service.scan_ports(&[631]).await;
        assert_eq!(report.results[0].status, PortStatus::InUse);
        assert_eq!(report.results[0].pid, 0);
        assert!(service.platform().attributed.lock().is_empty());
    }

    #[tokio::test]
    async fn test_attribution_failure_keeps_in_use() {
        let mut platform = FakePlatform::with_listeners(&[(5432, 99)]);
        platform.failing_pids = vec![99];
        let service = PortScanService::new(platform);

        let report = service.scan_ports(&[5432]).await;
        let result = &report.results[0];
        assert_eq!(result.status, PortStatus::InUse);
        assert_eq!(result.pid, 99);
        assert!(result.process_name.is_empty());
        assert!(result.error.as_deref().unwrap().contains("no such process"));
    }

    #[tokio::test]
    async fn test_discovery_failure_reports_unknown() {
        let platform = FakePlatform {
            discovery_error: Some("lsof error: x; netstat error: y".to_string()),
            ..Default::default()
        };
        let service = PortScanService::new(platform);

        let report = service.scan_ports(&[3000, 8080]).await;
        assert!(!report.is_complete());
        for result in &report.results {
            assert_eq!(result.status, PortStatus::Unknown);
            assert!(result.error.as_deref().unwrap().contains("netstat error"));
        }
    }

    #[tokio::test]
    async fn test_scan_port_surfaces_discovery_error() {
        let platform = FakePlatform {
            discovery_error: Some("netstat missing".to_string()),
            ..Default::default()
        };
        let service = PortScanService::new(platform);
        let err = assert_err!(service.scan_port(3000).await);
        assert!(matches!(err, Error::Discovery(_)));

        let service = PortScanService::new(FakePlatform::with_listeners(&[(3000, 5)]));
        let result = assert_ok!(service.scan_port(3000).await);
        assert_eq!(result.pid, 5);
    }

    #[tokio::test]
    async fn test_kill_pid_validates_and_forwards() {
        let service = PortScanService::new(FakePlatform::default());

        assert!(matches!(
            service.kill_pid(0, false).await,
            Err(Error::InvalidPid(0))
        ));
        assert_ok!(service.kill_pid(1234, true).await);
        assert_eq!(*service.platform().terminated.lock(), vec![(1234, true)]);
    }
}
