//! Configuration management for the server.

use std::env;

/// How long a loaded cart stays fresh in the in-process cache.
const DEFAULT_CART_CACHE_TTL_MS: u64 = 10 * 60 * 1000;

/// Upper bound on lines accepted in a single cart payload.
const DEFAULT_MAX_CART_LINES: usize = 500;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Secret key for token validation (placeholder for auth)
    pub auth_secret: Option<String>,
    /// TTL for cached account carts, in milliseconds
    pub cart_cache_ttl_ms: u64,
    /// Maximum number of lines accepted in one cart payload
    pub max_cart_lines: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let auth_secret = env::var("AUTH_SECRET").ok();

        let cart_cache_ttl_ms = match env::var("CART_CACHE_TTL_MS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidCartCacheTtl)?,
            Err(_) => DEFAULT_CART_CACHE_TTL_MS,
        };

        let max_cart_lines = match env::var("MAX_CART_LINES") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidMaxCartLines)?,
            Err(_) => DEFAULT_MAX_CART_LINES,
        };

        Ok(Self {
            host,
            port,
            database_url,
            auth_secret,
            cart_cache_ttl_ms,
            max_cart_lines,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid CART_CACHE_TTL_MS value")]
    InvalidCartCacheTtl,

    #[error("Invalid MAX_CART_LINES value")]
    InvalidMaxCartLines,
}
