use crate::models::{TrackCatalog, UserConfig};
use crate::services::SetupStore;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Configuration manager for loading and saving YAML configuration files.
///
/// Manages two configuration files:
/// - User config (`Companion Config.yaml`): Setups directory, logging settings
/// - Track catalog (`Track Catalog.yaml`): Known tracks and their folder ids
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    user_config_path: Utf8PathBuf,
    track_catalog_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing configuration files (e.g., "Companion Data")
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            user_config_path: config_dir.join("Companion Config.yaml"),
            track_catalog_path: config_dir.join("Track Catalog.yaml"),
            config_dir,
        })
    }

    /// Load the user configuration file.
    ///
    /// # Returns
    /// The loaded UserConfig, or default if file doesn't exist
    pub fn load_user_config(&self) -> Result<UserConfig> {
        if !self.user_config_path.exists() {
            tracing::warn!(
                "User config file not found at {}, using defaults",
                self.user_config_path
            );
            return Ok(UserConfig::default());
        }

        let file_contents = fs::read_to_string(&self.user_config_path)
            .with_context(|| format!("Failed to read user config: {}", self.user_config_path))?;

        let config: UserConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse user config: {}", self.user_config_path))?;

        tracing::info!("Loaded user config from {}", self.user_config_path);
        Ok(config)
    }

    /// Save the user configuration file.
    pub fn save_user_config(&self, config: &UserConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize user config to YAML")?;

        fs::write(&self.user_config_path, yaml_string)
            .with_context(|| format!("Failed to write user config: {}", self.user_config_path))?;

        tracing::info!("Saved user config to {}", self.user_config_path);
        Ok(())
    }

    /// Load the track catalog.
    ///
    /// # Returns
    /// The loaded TrackCatalog, or the built-in catalog if the file doesn't exist
    pub fn load_track_catalog(&self) -> Result<TrackCatalog> {
        if !self.track_catalog_path.exists() {
            tracing::warn!(
                "Track catalog not found at {}, using built-in tracks",
                self.track_catalog_path
            );
            return Ok(TrackCatalog::default());
        }

        let file_contents = fs::read_to_string(&self.track_catalog_path).with_context(|| {
            format!("Failed to read track catalog: {}", self.track_catalog_path)
        })?;

        let catalog: TrackCatalog = serde_yaml_ng::from_str(&file_contents).with_context(|| {
            format!("Failed to parse track catalog: {}", self.track_catalog_path)
        })?;

        tracing::info!(
            "Loaded {} track(s) from {}",
            catalog.len(),
            self.track_catalog_path
        );
        Ok(catalog)
    }

    pub fn save_track_catalog(&self, catalog: &TrackCatalog) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(catalog)
            .context("Failed to serialize track catalog to YAML")?;

        fs::write(&self.track_catalog_path, yaml_string).with_context(|| {
            format!("Failed to write track catalog: {}", self.track_catalog_path)
        })?;

        tracing::info!("Saved track catalog to {}", self.track_catalog_path);
        Ok(())
    }

    /// Resolve the setups root for `config`.
    ///
    /// An empty `Setups Directory` means the simulator's default location.
    pub fn setups_dir(&self, config: &UserConfig) -> Result<Utf8PathBuf> {
        let configured = config.companion_settings.setups_dir.trim();
        if !configured.is_empty() {
            return Ok(Utf8PathBuf::from(configured));
        }

        SetupStore::default_root()
            .context("Could not determine the Documents directory; set 'Setups Directory'")
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}
