use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Rummage
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Port the API server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix used when building absolute URLs returned to clients.
    /// Derived from the port when left empty.
    #[serde(rename = "base-url", default)]
    pub base_url: String,
}

/// Job store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,
}

/// Scraper behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Default per-page HTTP deadline in milliseconds
    #[serde(rename = "default-timeout-ms", default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Default wait between response headers and body read, in milliseconds
    #[serde(rename = "default-wait-time-ms", default)]
    pub default_wait_time_ms: u64,

    /// Upper bound on concurrently running background jobs
    #[serde(rename = "max-concurrent-jobs", default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: u32,

    /// Hours a persisted job survives before its record expires
    #[serde(rename = "job-expiration-hours", default = "default_job_expiration_hours")]
    pub job_expiration_hours: u32,
}

fn default_port() -> u16 {
    8080
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_concurrent_jobs() -> u32 {
    10
}

fn default_job_expiration_hours() -> u32 {
    24
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            base_url: String::new(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            default_wait_time_ms: 0,
            max_concurrent_jobs: default_max_concurrent_jobs(),
            job_expiration_hours: default_job_expiration_hours(),
        }
    }
}

impl Config {
    /// Returns the base URL clients should use to reach this server,
    /// falling back to `http://localhost:{port}` when unconfigured.
    pub fn base_url(&self) -> String {
        if self.server.base_url.is_empty() {
            format!("http://localhost:{}", self.server.port)
        } else {
            self.server.base_url.trim_end_matches('/').to_string()
        }
    }

    /// TTL applied to every persisted job record
    pub fn job_expiration(&self) -> Duration {
        Duration::from_secs(u64::from(self.scraper.job_expiration_hours) * 3600)
    }
}
