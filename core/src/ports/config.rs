//! Configuration repository port (interface).

use crate::domain::Config;
use crate::error::Result;

/// Port for configuration persistence.
///
/// This trait defines the interface for storing and retrieving the user's
/// port selection and preferences.
pub trait ConfigRepository: Send + Sync {
    /// Load the configuration, falling back to defaults when none is stored.
    fn load(&self) -> impl std::future::Future<Output = Result<Config>> + Send;

    /// Persist the configuration atomically.
    fn save(&self, config: &Config) -> impl std::future::Future<Output = Result<()>> + Send;
}
