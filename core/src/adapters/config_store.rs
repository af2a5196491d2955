//! Configuration persistence for the port selection and preferences.
//!
//! Stores configuration in JSON format at
//! `<user config dir>/portsentinel/config.json`.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::domain::Config;
use crate::error::{Error, Result};
use crate::ports::ConfigRepository;

/// Configuration store for managing app settings.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `<user config dir>/portsentinel/config.json`
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        Ok(Self {
            config_path: config_dir.join("portsentinel").join("config.json"),
        })
    }

    /// Create a config store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist. Missing sections
    /// are filled with defaults.
    pub async fn load(&self) -> Result<Config> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.config_path.display(), "No config file, using defaults");
                return Ok(Config::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut config: Config = serde_json::from_str(&content)?;
        config.normalize();
        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Writes a temp file next to the target, syncs it and renames it over
    /// the target. The temp file is removed if any step fails.
    pub async fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self
            .config_path
            .parent()
            .ok_or_else(|| Error::Config("Config path has no parent directory".to_string()))?;
        create_private_dir(config_dir).await?;

        // Serialize with pretty printing
        let content = serde_json::to_string_pretty(config)?;

        let temp_path = self.config_path.with_extension("json.tmp");
        if let Err(e) = self.write_and_replace(&temp_path, content.as_bytes()).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        debug!(path = %self.config_path.display(), "Config saved");
        Ok(())
    }

    async fn write_and_replace(&self, temp_path: &Path, content: &[u8]) -> Result<()> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        drop(file);

        restrict_permissions(temp_path).await?;
        fs::rename(temp_path, &self.config_path).await?;
        Ok(())
    }
}

impl ConfigRepository for ConfigStore {
    async fn load(&self) -> Result<Config> {
        ConfigStore::load(self).await
    }

    async fn save(&self, config: &Config) -> Result<()> {
        ConfigStore::save(self, config).await
    }
}

#[cfg(unix)]
async fn create_private_dir(dir: &Path) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    std::os::unix::fs::DirBuilderExt::mode(&mut builder, 0o700);
    builder.recursive(true);
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || builder.create(&dir))
        .await
        .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))??;
    Ok(())
}

#[cfg(not(unix))]
async fn create_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).await?;
    Ok(())
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
