//! Configuration loading and resolution
//!
//! Bootstrap settings follow this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The binary collects 1 and 2 through clap (`ConfigOverrides`); this module
//! loads 3 and merges everything into a `ServiceConfig`.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Default connection pool size for on-disk databases
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP bind host
    #[serde(default)]
    pub host: Option<String>,

    /// HTTP bind port
    #[serde(default)]
    pub port: Option<u16>,

    /// Maximum pooled database connections
    #[serde(default)]
    pub max_connections: Option<u32>,

    /// Insert sample recipes into an empty catalog on startup
    #[serde(default)]
    pub seed_sample_data: Option<bool>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// `--no-seed` can only disable seeding, never force it on
    pub no_seed: bool,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub seed_sample_data: bool,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge overrides, TOML values, and compiled defaults
    pub fn resolve(overrides: ConfigOverrides, toml_config: TomlConfig) -> Self {
        let database_path = overrides
            .database_path
            .or(toml_config.database_path)
            .unwrap_or_else(default_database_path);

        let host = overrides
            .host
            .or(toml_config.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = overrides.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);

        let seed_sample_data = !overrides.no_seed && toml_config.seed_sample_data.unwrap_or(true);

        Self {
            database_path,
            host,
            port,
            max_connections: toml_config
                .max_connections
                .unwrap_or(DEFAULT_MAX_CONNECTIONS)
                .max(1),
            seed_sample_data,
            log_level: toml_config.logging.level,
        }
    }

    /// `host:port` string for the TCP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load the TOML bootstrap file
///
/// A missing file is not an error: a warning is logged and defaults are used.
/// A file that exists but cannot be read or parsed is `Error::Config`.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Platform config file location: `<config_dir>/recipes/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("recipes").join("config.toml"))
}

/// Platform database location: `<data_local_dir>/recipes/recipes.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("recipes"))
        .unwrap_or_else(|| PathBuf::from("./recipes_data"))
        .join("recipes.db")
}
