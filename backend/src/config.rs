//! Configuration management for the SiteOps backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SITEOPS_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Redis cache configuration
    pub cache: CacheConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Notification delivery configuration
    pub notifications: NotificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Redis connection URL
    pub redis_url: String,

    /// TTL for warehouse inventory views, in seconds
    pub inventory_ttl_secs: u64,

    /// TTL for the low-stock view, in seconds (shorter: alerts should be fresh)
    pub low_stock_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for verifying JWT tokens
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// Push relay endpoint; empty disables push delivery
    pub push_endpoint: String,

    /// Push relay API key
    pub push_api_key: String,

    /// Email relay endpoint; empty disables email delivery
    pub email_endpoint: String,

    /// Sender address for outgoing email
    pub email_from: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SITEOPS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("cache.redis_url", "redis://127.0.0.1:6379")?
            .set_default("cache.inventory_ttl_secs", 300)?
            .set_default("cache.low_stock_ttl_secs", 120)?
            .set_default("jwt.secret", "development-secret-key")?
            .set_default("notifications.push_endpoint", "")?
            .set_default("notifications.push_api_key", "")?
            .set_default("notifications.email_endpoint", "")?
            .set_default("notifications.email_from", "noreply@siteops.local")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SITEOPS_ prefix)
            .add_source(
                Environment::with_prefix("SITEOPS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
