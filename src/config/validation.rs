use crate::config::types::Config;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::Validation(
            "server.port must be non-zero".to_string(),
        ));
    }

    if config.redis.url.is_empty() {
        return Err(ConfigError::Validation(
            "redis.url cannot be empty".to_string(),
        ));
    }

    if config.scraper.default_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "scraper.default-timeout-ms must be >= 1".to_string(),
        ));
    }

    if config.scraper.max_concurrent_jobs < 1 || config.scraper.max_concurrent_jobs > 100 {
        return Err(ConfigError::Validation(format!(
            "scraper.max-concurrent-jobs must be between 1 and 100, got {}",
            config.scraper.max_concurrent_jobs
        )));
    }

    if config.scraper.job_expiration_hours < 1 {
        return Err(ConfigError::Validation(
            "scraper.job-expiration-hours must be >= 1".to_string(),
        ));
    }

    Ok(())
}
