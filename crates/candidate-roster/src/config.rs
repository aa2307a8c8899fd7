//! Configuration management for candidate-roster.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::collections::HashSet;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::CANDIDATES_COLLECTION;
use crate::validate::Validator;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "candidate-roster";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "roster.db";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "ROSTER_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ROSTER_`)
/// 2. TOML config file at `~/.config/candidate-roster/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration.
    pub store: StoreConfig,
    /// Form configuration.
    pub form: FormConfig,
}

/// Store-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/candidate-roster/roster.db`
    pub database_path: Option<PathBuf>,
    /// Collection holding candidate records.
    pub collection: String,
}

/// Form-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Job roles a candidate may be recorded against.
    /// An empty list accepts any non-empty role.
    pub job_roles: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            collection: CANDIDATES_COLLECTION.to_string(),
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            job_roles: default_job_roles(),
        }
    }
}

/// Default job roles offered on the form.
fn default_job_roles() -> Vec<String> {
    vec![
        "Frontend Developer".to_string(),
        "Backend Developer".to_string(),
        "Full Stack Developer".to_string(),
        "DevOps Engineer".to_string(),
        "QA Engineer".to_string(),
        "UI/UX Designer".to_string(),
        "Product Manager".to_string(),
    ]
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let collection = &self.store.collection;
        if collection.is_empty() {
            return Err(Error::ConfigValidation {
                message: "store.collection must not be empty".to_string(),
            });
        }
        if !collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::ConfigValidation {
                message: format!(
                    "store.collection '{collection}' may only contain letters, digits, '_' or '-'"
                ),
            });
        }

        let mut seen = HashSet::new();
        for role in &self.form.job_roles {
            if role.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "form.job_roles must not contain blank entries".to_string(),
                });
            }
            if !seen.insert(role.as_str()) {
                return Err(Error::ConfigValidation {
                    message: format!("form.job_roles lists '{role}' more than once"),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.store
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Build the validator for the configured job roles.
    #[must_use]
    pub fn validator(&self) -> Validator {
        Validator::new(self.form.job_roles.iter().cloned())
    }
}
