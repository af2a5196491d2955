//! PortSentinel Core Library
//!
//! Cross-platform library for watching a configured set of TCP ports.
//! Provides functionality to:
//! - Discover listening TCP ports and the PIDs that own them
//! - Attribute PIDs to process name, command line and executable path
//! - Terminate processes by PID (gracefully or forcefully)
//! - Keep the user's port selection and the latest results in shared state
//! - Refresh periodically in the background
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - Linux: Uses `lsof` (or `netstat -lntp`), `/proc`, `ps` and `kill`
//! - macOS/BSD: Uses `lsof` (or `netstat`), `ps` and `kill`
//! - Windows: Uses `netstat -ano`, `tasklist`, `wmic` and `taskkill`

// Hexagonal architecture layers
pub mod domain;
pub mod ports;
pub mod adapters;
pub mod application;

pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    Config, ListenerInfo, PortScanResult, PortStatus, ProcessInfo, Protocol, UiConfig,
};

// Re-export other commonly used types
pub use adapters::{ConfigStore, HostPlatform};
pub use application::{AppState, AutoRefresher, PortScanService, PortService};
pub use error::{Error, Result};
pub use ports::{ConfigRepository, PortScannerPort, ProcessPlatform, ScanReport};

/// The service wired to the host OS tools and the on-disk configuration.
pub type HostPortService = PortService<PortScanService<HostPlatform>, ConfigStore>;
