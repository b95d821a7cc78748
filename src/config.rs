//! Configuration resolution for barkeep
//!
//! Resolution priority per field: environment variable, then TOML file,
//! then built-in default. The TOML file path itself comes from
//! `BARKEEP_CONFIG` (default `barkeep.toml`, optional).

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5740";
const DEFAULT_DB_PATH: &str = "barkeep.db";
const DEFAULT_COCKTAILDB_KEY: &str = "1";
const DEFAULT_COCKTAILDB_BASE: &str = "https://www.thecocktaildb.com/api/json/v1";
const DEFAULT_WIKIPEDIA_BASE: &str = "https://en.wikipedia.org/api/rest_v1";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Optional TOML overrides, all fields absent by default
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    bind_addr: Option<String>,
    database_path: Option<String>,
    cocktaildb_api_key: Option<String>,
    cocktaildb_base_url: Option<String>,
    wikipedia_base_url: Option<String>,
    request_timeout_ms: Option<u64>,
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen address
    pub bind_addr: String,
    /// SQLite database file path
    pub database_path: PathBuf,
    /// TheCocktailDB API key ("1" is the public test key)
    pub cocktaildb_api_key: String,
    /// TheCocktailDB base URL, without the trailing key segment
    pub cocktaildb_base_url: String,
    /// Wikipedia REST base URL
    pub wikipedia_base_url: String,
    /// Timeout applied to every outward provider/enrichment request
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            cocktaildb_api_key: DEFAULT_COCKTAILDB_KEY.to_string(),
            cocktaildb_base_url: DEFAULT_COCKTAILDB_BASE.to_string(),
            wikipedia_base_url: DEFAULT_WIKIPEDIA_BASE.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl Config {
    /// Load configuration from the default TOML location plus environment
    pub fn load() -> Result<Self> {
        let path = std::env::var("BARKEEP_CONFIG").unwrap_or_else(|_| "barkeep.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load configuration from a specific TOML file (missing file is fine)
    pub fn load_from(path: &Path) -> Result<Self> {
        let toml_config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let parsed: TomlConfig = toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("invalid TOML in {}: {}", path.display(), e)))?;
            info!("Loaded configuration from {}", path.display());
            parsed
        } else {
            TomlConfig::default()
        };

        let defaults = Config::default();

        let timeout_ms = env_var("BARKEEP_REQUEST_TIMEOUT_MS")
            .map(|v| {
                v.parse::<u64>()
                    .map_err(|_| Error::Config(format!("BARKEEP_REQUEST_TIMEOUT_MS not a number: {v}")))
            })
            .transpose()?
            .or(toml_config.request_timeout_ms)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);

        Ok(Self {
            bind_addr: env_var("BARKEEP_BIND_ADDR")
                .or(toml_config.bind_addr)
                .unwrap_or(defaults.bind_addr),
            database_path: env_var("BARKEEP_DB_PATH")
                .or(toml_config.database_path)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            cocktaildb_api_key: env_var("BARKEEP_COCKTAILDB_API_KEY")
                .or(toml_config.cocktaildb_api_key)
                .unwrap_or(defaults.cocktaildb_api_key),
            cocktaildb_base_url: env_var("BARKEEP_COCKTAILDB_BASE_URL")
                .or(toml_config.cocktaildb_base_url)
                .unwrap_or(defaults.cocktaildb_base_url),
            wikipedia_base_url: env_var("BARKEEP_WIKIPEDIA_BASE_URL")
                .or(toml_config.wikipedia_base_url)
                .unwrap_or(defaults.wikipedia_base_url),
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
