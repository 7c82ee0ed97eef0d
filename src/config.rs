//! Runtime settings, read from the environment.
//!
//! A `.env` file in the working directory is loaded first (if there is one),
//! so the same variables can be kept there instead of the shell:
//!
//! - `SLATE_DATA_DIR`: where snapshot files live, defaults to `.`
//! - `SLATE_LOG`: log level (`off`, `error`, `warn`, `info`, `debug`, `trace`),
//!   defaults to `info`

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;

pub const DATA_DIR_VAR: &str = "SLATE_DATA_DIR";
pub const LOG_LEVEL_VAR: &str = "SLATE_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("."),
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config, String> {
        //! Load `.env` if present and build the config from the process
        //! environment.

        if let Err(error) = dotenvy::dotenv() {
            if !error.not_found() {
                return Err(format!("invalid .env file: {}", error));
            }
        }

        Config::from_vars(env::var(DATA_DIR_VAR).ok(), env::var(LOG_LEVEL_VAR).ok())
    }

    pub fn from_vars(data_dir: Option<String>, log_level: Option<String>) -> Result<Config, String> {
        let mut config = Config::default();

        if let Some(data_dir) = data_dir.filter(|dir| !dir.trim().is_empty()) {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Some(level) = log_level {
            config.log_level = LevelFilter::from_str(level.trim())
                .map_err(|_| format!("invalid log level {}: set {} to e.g. info", level, LOG_LEVEL_VAR))?;
        }

        Ok(config)
    }
}
