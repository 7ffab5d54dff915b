//! Configuration module for Rummage
//!
//! Configuration is a flat set of documented defaults, optionally layered
//! with a TOML file and `RUMMAGE_*` environment overrides.

mod loader;
mod types;
mod validation;

pub use loader::load_config;
pub use types::{Config, RedisConfig, ScraperConfig, ServerConfig};
pub use validation::validate;
