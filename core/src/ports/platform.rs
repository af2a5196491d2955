//! Platform capability port (interface).

use std::collections::HashMap;

use crate::domain::{ListenerInfo, ProcessInfo};
use crate::error::{Error, Result};

/// Listening sockets found by one discovery pass.
///
/// `error` describes why discovery failed; a failed pass has no listeners.
#[derive(Debug, Default)]
pub struct Discovery {
    pub listeners: HashMap<u16, ListenerInfo>,
    pub error: Option<Error>,
}

impl Discovery {
    /// A successful pass.
    pub fn found(listeners: HashMap<u16, ListenerInfo>) -> Self {
        Self {
            listeners,
            error: None,
        }
    }

    /// A pass where every tool failed.
    pub fn failed(error: Error) -> Self {
        Self {
            listeners: HashMap::new(),
            error: Some(error),
        }
    }
}

/// Port for the OS-specific half of scanning and termination.
///
/// Exactly one implementation is compiled in for the host OS. Each method
/// spawns bounded subprocesses and never blocks past the tool timeouts.
pub trait ProcessPlatform: Send + Sync {
    /// Map every listening TCP port to its owning PID and local address.
    fn discover_listeners(&self) -> impl std::future::Future<Output = Discovery> + Send;

    /// Resolve a PID to its process name, command line and executable path.
    ///
    /// Fails with [`Error::InvalidPid`] for PID 0 without spawning anything.
    fn attribute_process(
        &self,
        pid: u32,
    ) -> impl std::future::Future<Output = Result<ProcessInfo>> + Send;

    /// Ask the OS to terminate `pid`, forcefully if `force` is set.
    fn terminate(
        &self,
        pid: u32,
        force: bool,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
