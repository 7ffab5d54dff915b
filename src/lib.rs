//! Rummage: a self-hosted page-to-artifact scraping service
//!
//! This crate fetches web pages and converts them into structured,
//! LLM-friendly artifacts (Markdown, cleaned HTML, raw HTML, link lists,
//! metadata), and orchestrates batch scrapes, site maps and recursive
//! crawls on top of that primitive, persisting job state in Redis.

pub mod config;
pub mod jobs;
pub mod mapper;
pub mod model;
pub mod scrape;
pub mod server;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for Rummage operations
#[derive(Debug, Error)]
pub enum RummageError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Job store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid environment override {key}: {message}")]
    InvalidEnv { key: String, message: String },
}

/// Result type alias for Rummage operations
pub type Result<T> = std::result::Result<T, RummageError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{PageArtifact, ScrapeRequest};
pub use scrape::Extractor;
pub use store::JobStore;
