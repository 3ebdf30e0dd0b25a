//! Configuration loader for the weather logging backend.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;

use anyhow::{anyhow, bail, Result};

/// Parse an optional environment variable into `$ty`, with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional environment variable into `$ty`, `None` when unset.
macro_rules! parse_env_opt {
    ($var_name:expr, $ty:ty) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

pub const DEFAULT_WEATHER_API_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub db_url: Option<String>,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// TCP port the HTTP server binds on all interfaces.
    pub http_port: u16,

    /// HMAC secret for signing bearer tokens.
    pub jwt_secret: String,

    /// Lifetime of issued tokens, in seconds.
    pub jwt_ttl_secs: u64,

    /// Account created on first boot when no user exists.
    pub admin: AdminSeed,

    /// Periodic weather fetcher; disabled when `None`.
    pub collector: Option<CollectorConfig>,
}

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub api_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub location: String,
    pub interval_minutes: u64,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `JWT_SECRET` – token signing secret
///
/// Optional:
/// - `DATABASE_URL` – PostgreSQL connection string (in-memory store if unset)
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `HTTP_PORT` – listen port (default: 3001)
/// - `JWT_TTL_SECS` – token lifetime (default: 3600)
/// - `ADMIN_EMAIL`, `ADMIN_PASSWORD`, `ADMIN_NAME` – default admin seed
/// - `LOCATION`, `CITY_LAT`, `CITY_LON` – enable the collector when all set
/// - `WEATHER_API_URL` – forecast endpoint (default: Open-Meteo)
/// - `WEATHER_INTERVAL_MINUTES` – collector period (default: 60)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
    let db_pool_max = parse_env!("DB_POOL_MAX", u32, 5);
    let http_port = parse_env!("HTTP_PORT", u16, 3001);
    let jwt_secret = require_env!("JWT_SECRET");
    let jwt_ttl_secs = parse_env!("JWT_TTL_SECS", u64, 3600);

    let admin = AdminSeed {
        email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string()),
        password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "123456".to_string()),
        name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin User".to_string()),
    };

    let location = env::var("LOCATION").ok();
    let latitude = parse_env_opt!("CITY_LAT", f64);
    let longitude = parse_env_opt!("CITY_LON", f64);

    let collector = match (location, latitude, longitude) {
        (Some(location), Some(latitude), Some(longitude)) => {
            let interval_minutes = parse_env!("WEATHER_INTERVAL_MINUTES", u64, 60);
            if interval_minutes == 0 {
                bail!("WEATHER_INTERVAL_MINUTES must be greater than zero");
            }
            Some(CollectorConfig {
                api_url: env::var("WEATHER_API_URL")
                    .unwrap_or_else(|_| DEFAULT_WEATHER_API_URL.to_string()),
                latitude,
                longitude,
                location,
                interval_minutes,
            })
        }
        _ => None,
    };

    Ok(Config {
        db_url,
        db_pool_max,
        http_port,
        jwt_secret,
        jwt_ttl_secs,
        admin,
        collector,
    })
}

/// Mask the password portion of a connection string.
pub fn mask_db_url(db_url: &str) -> String {
    // ---
    if let Some(at_pos) = db_url.rfind('@') {
        if let Some(colon_pos) = db_url[..at_pos].rfind(':') {
            // `postgres://host` has its only colon in the scheme
            if !db_url[colon_pos..].starts_with("://") {
                return format!("{}:****{}", &db_url[..colon_pos], &db_url[at_pos..]);
            }
        }
    }
    db_url.to_string()
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the database password; secrets are never printed.
    pub fn log_config(&self) {
        // ---
        let db = self
            .db_url
            .as_deref()
            .map(mask_db_url)
            .unwrap_or_else(|| "<unset, in-memory store>".to_string());

        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL   : {}", db);
        tracing::info!("  DB_POOL_MAX    : {}", self.db_pool_max);
        tracing::info!("  HTTP_PORT      : {}", self.http_port);
        tracing::info!("  JWT_TTL_SECS   : {}", self.jwt_ttl_secs);
        tracing::info!("  ADMIN_EMAIL    : {}", self.admin.email);
        match &self.collector {
            Some(c) => {
                tracing::info!(
                    "  COLLECTOR      : {} ({}, {})",
                    c.location,
                    c.latitude,
                    c.longitude
                );
                tracing::info!("  API_URL        : {}", c.api_url);
                tracing::info!("  INTERVAL_MIN   : {}", c.interval_minutes);
            }
            None => tracing::info!("  COLLECTOR      : disabled"),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_mask_password() {
        // ---
        assert_eq!(
            mask_db_url("postgres://weather:hunter2@db:5432/weather"),
            "postgres://weather:****@db:5432/weather"
        );
    }

    #[test]
    fn test_mask_without_password() {
        // ---
        assert_eq!(
            mask_db_url("postgres://weather@db/weather"),
            "postgres://weather@db/weather"
        );
        assert_eq!(mask_db_url("postgres://db/weather"), "postgres://db/weather");
    }
}
