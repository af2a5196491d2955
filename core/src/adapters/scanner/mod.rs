//! Platform adapters for discovery, attribution and termination.
//!
//! Platform-specific implementations wrap the OS tools; the output parsers
//! are shared and compiled on every platform.

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

pub mod parse;
mod utils;

pub use utils::Utils;

#[cfg(not(any(unix, windows)))]
compile_error!("Unsupported platform: only Unix and Windows are supported");

use crate::domain::ProcessInfo;
use crate::error::Result;
use crate::ports::{Discovery, ProcessPlatform};

/// The platform strategy for the host OS, selected at compile time.
#[derive(Debug, Default)]
pub struct HostPlatform {
    #[cfg(unix)]
    inner: unix::UnixPlatform,

    #[cfg(windows)]
    inner: windows::WindowsPlatform,
}

impl HostPlatform {
    /// Create the platform strategy for the current OS.
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            inner: unix::UnixPlatform::new(),

            #[cfg(windows)]
            inner: windows::WindowsPlatform::new(),
        }
    }
}

impl ProcessPlatform for HostPlatform {
    async fn discover_listeners(&self) -> Discovery {
        self.inner.discover_listeners().await
    }

    async fn attribute_process(&self, pid: u32) -> Result<ProcessInfo> {
        self.inner.attribute_process(pid).await
    }

    async fn terminate(&self, pid: u32, force: bool) -> Result<()> {
        self.inner.terminate(pid, force).await
    }
}
