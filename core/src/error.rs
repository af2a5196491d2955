//! Error types for the portsentinel-core library.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for portsentinel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during port scanning and process management.
#[derive(Error, Debug)]
pub enum Error {
    /// Port number outside 1-65535.
    #[error("port must be 1-65535, got {0}")]
    InvalidPort(u32),

    /// Custom port already configured.
    #[error("port {0} already exists")]
    DuplicatePort(u16),

    /// Custom port not configured.
    #[error("port {0} not found")]
    PortNotFound(u16),

    /// PID that can never name a real process.
    #[error("invalid pid: {0}")]
    InvalidPid(u32),

    /// Attempt to terminate the running application itself.
    #[error("refusing to terminate own process (pid {0})")]
    SelfTermination(u32),

    /// A subprocess exceeded its deadline and was killed.
    #[error("{program}: deadline exceeded after {}ms", timeout.as_millis())]
    CommandTimeout { program: String, timeout: Duration },

    /// A subprocess could not be started or exited unsuccessfully.
    #[error("{program}: {reason}")]
    CommandFailed { program: String, reason: String },

    /// Every available discovery tool failed.
    #[error("port discovery failed: {0}")]
    Discovery(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True when a subprocess hit its deadline, i.e. the tool likely hung.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::CommandTimeout { .. })
    }
}
