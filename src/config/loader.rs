use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "RUMMAGE";

/// Loads configuration from an optional TOML file plus environment overrides
///
/// Precedence, lowest to highest: built-in defaults, config file values,
/// `RUMMAGE_*` environment variables. A missing file is not an error; the
/// defaults simply apply.
///
/// Environment names are derived from the config keys by replacing `.`
/// with `_` and upper-casing, e.g. `server.port` becomes
/// `RUMMAGE_SERVER_PORT`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        _ => Config::default(),
    };

    apply_env_overrides(&mut config)?;
    validate(&config)?;

    Ok(config)
}

/// Applies `RUMMAGE_*` environment variables on top of the loaded values
fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    if let Some(value) = env_override("server.port") {
        config.server.port = parse_env("server.port", &value)?;
    }
    if let Some(value) = env_override("server.baseURL") {
        config.server.base_url = value;
    }
    if let Some(value) = env_override("redis.url") {
        config.redis.url = value;
    }
    if let Some(value) = env_override("scraper.defaultTimeoutMS") {
        config.scraper.default_timeout_ms = parse_env("scraper.defaultTimeoutMS", &value)?;
    }
    if let Some(value) = env_override("scraper.defaultWaitTimeMS") {
        config.scraper.default_wait_time_ms = parse_env("scraper.defaultWaitTimeMS", &value)?;
    }
    if let Some(value) = env_override("scraper.maxConcurrentJobs") {
        config.scraper.max_concurrent_jobs = parse_env("scraper.maxConcurrentJobs", &value)?;
    }
    if let Some(value) = env_override("scraper.jobExpirationHours") {
        config.scraper.job_expiration_hours = parse_env("scraper.jobExpirationHours", &value)?;
    }
    Ok(())
}

/// Maps a dotted config key to its environment name and reads it
fn env_override(key: &str) -> Option<String> {
    let name = format!("{}_{}", ENV_PREFIX, key.replace('.', "_").to_uppercase());
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        message: format!("cannot parse '{}'", value),
    })
}
