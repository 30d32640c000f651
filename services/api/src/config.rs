//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub db_max_connections: u32,
    pub cors_origin: String,
    pub session_ttl_days: i64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), 5)?;

        // --- HTTP Surface Settings ---
        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let session_ttl_days = parse_or("SESSION_TTL_DAYS", lookup("SESSION_TTL_DAYS"), 30)?;
        if session_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_DAYS".to_string(),
                "must be positive".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            db_max_connections,
            cors_origin,
            session_ttl_days,
        })
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_is_set() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/logbook")]).expect("config");
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.session_ttl_days, 30);
        assert_eq!(config.cors_origin, "http://localhost:3000");
    }

    #[test]
    fn database_url_is_required() {
        match load(&[]) {
            Err(ConfigError::MissingVar(var)) => assert_eq!(var, "DATABASE_URL"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_values() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/logbook"),
            ("DB_MAX_CONNECTIONS", "many"),
        ])
        .expect_err("non-numeric pool size");
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "DB_MAX_CONNECTIONS"));

        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/logbook"),
            ("RUST_LOG", "chatty"),
        ])
        .expect_err("unknown level");
        assert!(err.to_string().contains("RUST_LOG"));

        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/logbook"),
            ("SESSION_TTL_DAYS", "0"),
        ])
        .expect_err("zero ttl");
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "SESSION_TTL_DAYS"));
    }
}
