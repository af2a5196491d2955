//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod config;
mod port;

// Re-export all domain types
pub use config::{
    default_preset_ports, validate_port, Config, UiConfig, DEFAULT_PRESET_PORTS,
    DEFAULT_REFRESH_INTERVAL_MS,
};
pub use port::{ListenerInfo, PortScanResult, PortStatus, ProcessInfo, Protocol};
