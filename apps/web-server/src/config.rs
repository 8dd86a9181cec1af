//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use yatube_infra::database::DatabaseConfig;
use yatube_infra::{JwtConfig, RateLimitConfig};

/// Staff account created at startup when it does not exist yet.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub session: JwtConfig,
    pub login_rate_limit: RateLimitConfig,
    pub admin: Option<AdminBootstrap>,
    /// Production mode: secure cookies, louder secret warnings.
    pub production: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key/value source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| get(key).and_then(|v| v.trim().parse::<u64>().ok());

        let database = get("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS").unwrap_or(20) as u32,
            min_connections: parsed("DB_MIN_CONNECTIONS").unwrap_or(2) as u32,
        });

        let defaults = JwtConfig::default();
        let session = JwtConfig {
            secret: get("SESSION_SECRET").unwrap_or(defaults.secret),
            expiration_hours: parsed("SESSION_HOURS")
                .map(|h| h as i64)
                .unwrap_or(defaults.expiration_hours),
            issuer: get("SESSION_ISSUER").unwrap_or(defaults.issuer),
        };

        let limit_defaults = RateLimitConfig::default();
        let login_rate_limit = RateLimitConfig {
            max_requests: parsed("RATE_LIMIT_MAX_REQUESTS")
                .map(|n| n as u32)
                .unwrap_or(limit_defaults.max_requests),
            window: parsed("RATE_LIMIT_WINDOW_SECS")
                .map(Duration::from_secs)
                .unwrap_or(limit_defaults.window),
        };

        let admin = match (get("ADMIN_USERNAME"), get("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminBootstrap { username, password }),
            _ => None,
        };

        Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parsed("PORT").map(|p| p as u16).unwrap_or(8080),
            database,
            session,
            login_rate_limit,
            admin,
            production: get("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false),
        }
    }
}
