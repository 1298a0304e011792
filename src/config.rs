//! Database configuration.
//!
//! Applications load settings from `config/config.toml` (a `[database]`
//! table) overlaid with `ROSTER__DATABASE__*` environment variables using
//! [`DatabaseConfig::load`].

use crate::executor::LifeError;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "config/config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string, e.g. `sqlite:///lazy_select.db`
    #[serde(default = "default_db_url")]
    pub url: String,
    /// Recognized for compatibility; has no effect on the data model
    #[serde(default)]
    pub track_modifications: bool,
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
}

fn default_db_url() -> String {
    "sqlite:///roster.db".to_string()
}

fn default_foreign_keys() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            track_modifications: false,
            foreign_keys: default_foreign_keys(),
        }
    }
}

impl DatabaseConfig {
    /// Configuration for `url` with every other setting at its default
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Load the database configuration from `config/config.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load the database configuration from `path` (optional) and env vars.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = Self::settings(path.as_ref())?;
        Self::from_settings(&settings)
    }

    /// Like [`DatabaseConfig::load`], but `url` is used when neither the file
    /// nor the environment sets `database.url`
    pub fn load_or(url: &str) -> Result<Self, ConfigError> {
        Self::load_from_or(DEFAULT_CONFIG_FILE, url)
    }

    pub fn load_from_or(path: impl AsRef<Path>, url: &str) -> Result<Self, ConfigError> {
        let settings = Self::settings(path.as_ref())?;
        let mut config = Self::from_settings(&settings)?;
        match settings.get_string("database.url") {
            Ok(_) => {}
            Err(ConfigError::NotFound(_)) => config.url = url.to_string(),
            Err(e) => return Err(e),
        }
        Ok(config)
    }

    fn settings(path: &Path) -> Result<Config, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("ROSTER").separator("__"));

        match builder.build() {
            Ok(cfg) => Ok(cfg),
            Err(err) => {
                // The file existed but could not be parsed; retry with env only
                if path.exists() {
                    log::warn!(
                        "failed to load {}, falling back to env: {}",
                        path.display(),
                        err
                    );
                }
                Config::builder()
                    .add_source(Environment::with_prefix("ROSTER").separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, \
                             then env-only error: {}",
                            err, env_err
                        ))
                    })
            }
        }
    }

    fn from_settings(settings: &Config) -> Result<Self, ConfigError> {
        match settings.get::<DatabaseConfig>("database") {
            Ok(db_config) => Ok(db_config),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "Database configuration could not be loaded from file or environment: {}",
                e
            ))),
        }
    }
}

impl From<ConfigError> for LifeError {
    fn from(err: ConfigError) -> Self {
        LifeError::Configuration(err.to_string())
    }
}
