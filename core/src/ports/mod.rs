//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with external systems. Implementations live in `adapters`.

mod config;
mod platform;
mod scanner;

pub use config::ConfigRepository;
pub use platform::{Discovery, ProcessPlatform};
pub use scanner::{PortScannerPort, ScanReport};
