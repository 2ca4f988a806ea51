use crate::error::{Result, WeatherError};
use crate::store::Database;
use crate::utils::constants::{
    DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_CONFIG_FILE, DEFAULT_DATABASE_PATH, DEFAULT_LOG_LEVEL,
    DEFAULT_PAGE_SIZE,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;
use validator::Validate;

/// Prefix for environment overrides, e.g. WEATHER_HISTORY_DATABASE_PATH
pub const ENV_PREFIX: &str = "WEATHER_HISTORY";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    pub database_path: PathBuf,

    #[validate(length(min = 1))]
    pub log_level: String,

    #[validate(range(min = 1))]
    pub busy_timeout_ms: u64,

    #[validate(range(min = 1))]
    pub page_size: usize,
}

impl Settings {
    /// Load settings layered as defaults -> config file -> environment.
    /// An explicit `config_file` must exist; the default one is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let builder = config::Config::builder()
            .set_default("database_path", DEFAULT_DATABASE_PATH)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("busy_timeout_ms", DEFAULT_BUSY_TIMEOUT_MS)?
            .set_default("page_size", DEFAULT_PAGE_SIZE as u64)?;

        let builder = match config_file {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings: Settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        settings.check_log_level()?;
        Ok(settings)
    }

    /// Only trace, debug, info, warn and error are accepted.
    fn check_log_level(&self) -> Result<()> {
        Level::from_str(self.log_level.trim())
            .map(|_| ())
            .map_err(|_| {
                WeatherError::Validation(format!(
                    "log_level: '{}' is not one of trace, debug, info, warn, error",
                    self.log_level
                ))
            })
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn open_database(&self) -> Result<Database> {
        let db = Database::open_with_timeout(&self.database_path, self.busy_timeout())?;
        Ok(db.with_page_size(self.page_size))
    }
}
