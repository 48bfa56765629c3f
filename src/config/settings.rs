use anyhow::{Context, Result};
use chrono::{FixedOffset, Local, Offset};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ledger::DEFAULT_MAX_LOOKBACK_DAYS;

fn default_max_lookback_days() -> u32 {
    DEFAULT_MAX_LOOKBACK_DAYS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Minutes east of UTC used to decide which calendar day an instant
    /// belongs to. Unset means the system's current local offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone_offset: Option<i32>,
    #[serde(default = "default_max_lookback_days")]
    pub max_lookback_days: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            timezone_offset: None,
            max_lookback_days: default_max_lookback_days(),
        }
    }
}

impl LedgerConfig {
    pub fn offset(&self) -> Result<FixedOffset> {
        match self.timezone_offset {
            Some(minutes) => FixedOffset::east_opt(minutes * 60)
                .with_context(|| format!("Timezone offset out of range: {} minutes", minutes)),
            None => Ok(Local::now().offset().fix()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Database file; unset means `prayer-ledger.db` in the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "prayer-ledger")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Database location, creating its parent directory if needed.
    pub fn db_path(&self) -> Result<PathBuf> {
        let path = match &self.storage.db_path {
            Some(path) => path.clone(),
            None => Self::data_dir()?.join("prayer-ledger.db"),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating {:?}", parent))?;
        }
        Ok(path)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&temp_dir.path().join("config.toml")).unwrap();

        assert_eq!(config.ledger.timezone_offset, None);
        assert_eq!(config.ledger.max_lookback_days, DEFAULT_MAX_LOOKBACK_DAYS);
        assert!(config.storage.db_path.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[ledger]\ntimezone_offset = 330\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.ledger.timezone_offset, Some(330));
        assert_eq!(config.ledger.max_lookback_days, DEFAULT_MAX_LOOKBACK_DAYS);
        assert_eq!(
            config.ledger.offset().unwrap(),
            FixedOffset::east_opt(330 * 60).unwrap()
        );
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.ledger.timezone_offset = Some(-300);
        config.ledger.max_lookback_days = 90;
        config.storage.db_path = Some(temp_dir.path().join("ledger.db"));
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.ledger.timezone_offset, Some(-300));
        assert_eq!(loaded.ledger.max_lookback_days, 90);
        assert_eq!(loaded.db_path().unwrap(), temp_dir.path().join("ledger.db"));
    }

    #[test]
    fn test_out_of_range_offset_is_rejected() {
        let config = LedgerConfig {
            timezone_offset: Some(24 * 60),
            ..LedgerConfig::default()
        };
        assert!(config.offset().is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[ledger\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
