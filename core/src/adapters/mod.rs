//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external systems: OS tools for
//! the platform strategy and the filesystem for configuration.

pub mod config_store;
pub mod exec;
pub mod scanner;

// Re-export main types for convenience
pub use config_store::ConfigStore;
pub use exec::{run_command, CommandOutput, CommandRunner, SystemRunner};
pub use scanner::HostPlatform;
