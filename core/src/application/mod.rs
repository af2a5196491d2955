//! Application layer - Use case services.
//!
//! This module contains application services that orchestrate
//! domain logic and adapter interactions.
//!
//! Services are designed to be thin orchestrators that:
//! - Accept domain types as inputs
//! - Use ports (traits) for external dependencies
//! - Return domain types as outputs

mod port_service;
mod refresher;
mod scan_service;
mod state;

pub use port_service::PortService;
pub use refresher::AutoRefresher;
pub use scan_service::PortScanService;
pub use state::AppState;
