//! Telemetry initialization - tracing subscriber setup.

use std::env;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info,web_server=debug,yatube_core=debug,yatube_infra=debug";

/// Telemetry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// One JSON object per line instead of the pretty console format.
    pub json_logs: bool,
    /// `EnvFilter` directives.
    pub filter: String,
}

impl TelemetryConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// `LOG_FORMAT` picks the output format and defaults to JSON under
    /// `RUST_ENV=production`. Statements logged by the database pool stay
    /// hidden unless `LOG_SQL` is set or `RUST_LOG` asks for them.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let production = get("RUST_ENV").is_some_and(|v| v == "production" || v == "prod");
        let json_logs = match get("LOG_FORMAT") {
            Some(format) => format.eq_ignore_ascii_case("json"),
            None => production,
        };

        let filter = match get("RUST_LOG").filter(|v| !v.trim().is_empty()) {
            Some(filter) => filter,
            None => {
                let log_sql = get("LOG_SQL").is_some_and(|v| v != "false" && v != "0");
                let sql_level = if log_sql { "info" } else { "warn" };
                format!("{DEFAULT_FILTER},sqlx::query={sql_level}")
            }
        };

        Self { json_logs, filter }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|e| {
            eprintln!("Invalid log filter {:?}: {}", self.filter, e);
            EnvFilter::new(DEFAULT_FILTER)
        })
    }
}

/// Initialize the global tracing subscriber.
pub fn init_telemetry(config: &TelemetryConfig) {
    let env_filter = config.env_filter();

    if config.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    tracing::info!(
        json_logs = config.json_logs,
        filter = %config.filter,
        "Telemetry initialized"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> TelemetryConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TelemetryConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_development_defaults() {
        let config = config(&[]);
        assert!(!config.json_logs);
        assert!(config.filter.starts_with(DEFAULT_FILTER));
        assert!(config.filter.ends_with("sqlx::query=warn"));
    }

    #[test]
    fn test_production_defaults_to_json() {
        assert!(config(&[("RUST_ENV", "production")]).json_logs);
        assert!(!config(&[("RUST_ENV", "production"), ("LOG_FORMAT", "pretty")]).json_logs);
        assert!(config(&[("LOG_FORMAT", "JSON")]).json_logs);
    }

    #[test]
    fn test_sql_logging_switch() {
        assert!(config(&[("LOG_SQL", "1")]).filter.ends_with("sqlx::query=info"));
        assert!(config(&[("LOG_SQL", "false")]).filter.ends_with("sqlx::query=warn"));
    }

    #[test]
    fn test_rust_log_is_used_verbatim() {
        let explicit = config(&[("RUST_LOG", "warn,web_server=trace"), ("LOG_SQL", "1")]);
        assert_eq!(explicit.filter, "warn,web_server=trace");

        let blank = config(&[("RUST_LOG", "  ")]);
        assert!(blank.filter.starts_with(DEFAULT_FILTER));
    }
}
