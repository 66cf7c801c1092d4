//! CLI configuration management.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Default local cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Build archives restorable on other operating systems.
    #[serde(default)]
    pub cross_os_archive: bool,
    /// How the cache directory is taken over before each operation.
    #[serde(default)]
    pub ownership: OwnershipMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnershipMode {
    /// `sudo chown -R` the cache directory to the current user.
    #[default]
    Sudo,
    /// Leave ownership as it is.
    Skip,
}

impl CliConfig {
    /// Load configuration from file.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::config_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let dirs = directories::ProjectDirs::from("io", "hoard", "hoard")
            .ok_or("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.yaml"))
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "cache_dir" => {
                self.cache_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "cross_os_archive" => {
                self.cross_os_archive = value
                    .parse()
                    .map_err(|_| format!("Invalid boolean: {}", value))?;
            }
            "ownership" => {
                self.ownership = match value {
                    "sudo" => OwnershipMode::Sudo,
                    "skip" => OwnershipMode::Skip,
                    _ => return Err(format!("Invalid ownership mode: {}", value)),
                };
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}
