// config.rs

use ::config::{Config, ConfigError, Environment, File};
use log::{debug, LevelFilter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CLIENT_NAME: &str = "midibridge";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 16;
pub const DEFAULT_LOG_LEVEL: &str = "debug";
pub const ENV_PREFIX: &str = "MIDIBRIDGE";

/// Runtime settings: built-in defaults, then an optional settings file, then
/// `MIDIBRIDGE_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub client_name: String,
    pub poll_interval_ms: u64,
    pub log_level: LevelFilter,
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            log_level: LevelFilter::Debug,
            log_dir: None,
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("client_name", DEFAULT_CLIENT_NAME)?
            .set_default("poll_interval_ms", DEFAULT_POLL_INTERVAL_MS as i64)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?;

        if let Some(path) = path {
            debug!("Reading settings from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let raw = builder.add_source(env).build()?;

        let poll_interval_ms = raw.get_int("poll_interval_ms")?;
        if poll_interval_ms <= 0 {
            return Err(ConfigError::Message(format!(
                "poll_interval_ms must be positive, got {}",
                poll_interval_ms
            )));
        }

        let log_level = raw.get_string("log_level")?;
        let log_level = LevelFilter::from_str(&log_level)
            .map_err(|_| ConfigError::Message(format!("unknown log_level '{}'", log_level)))?;

        let settings = Settings {
            client_name: raw.get_string("client_name")?,
            poll_interval_ms: poll_interval_ms as u64,
            log_level,
            log_dir: raw.get_string("log_dir").ok().map(PathBuf::from),
        };
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}
