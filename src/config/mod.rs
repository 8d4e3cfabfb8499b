//! Persistent preferences: where expenses live and how amounts are labelled.

use serde::{Deserialize, Serialize};
use std::{
    env,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::storage::DEFAULT_SLOT_KEY;
use crate::utils::persistence::replace_file;

const DEFAULT_DIR_NAME: &str = ".expense_tracker";
const CONFIG_FILE: &str = "config.json";
const HOME_ENV: &str = "EXPENSE_TRACKER_HOME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// User-configurable settings stored as JSON next to the expense slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom data directory. Defaults to `$EXPENSE_TRACKER_HOME` or `~/.expense_tracker`.
    pub data_dir: Option<PathBuf>,
    #[serde(default = "Config::default_slot_key")]
    pub slot_key: String,
    /// Display preference for a renderer; the store itself never formats amounts.
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    /// Display preference for a renderer, paired with `currency`.
    #[serde(default = "Config::default_locale")]
    pub locale: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            slot_key: Self::default_slot_key(),
            currency: Self::default_currency(),
            locale: Self::default_locale(),
        }
    }
}

impl Config {
    pub fn default_slot_key() -> String {
        DEFAULT_SLOT_KEY.into()
    }

    pub fn default_currency() -> String {
        "NGN".into()
    }

    pub fn default_locale() -> String {
        "en-NG".into()
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(path) = &self.data_dir {
            return path.clone();
        }
        default_data_dir()
    }
}

/// Returns `$EXPENSE_TRACKER_HOME` when set, otherwise `~/.expense_tracker`.
pub fn default_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Loads and saves [`Config`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Manager for `<base>/config.json`, creating `base` if needed.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join(CONFIG_FILE)))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the config, falling back to defaults when the file does not exist.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        replace_file(&self.config_path, &json)?;
        Ok(())
    }
}
