//! Admin API configuration.
//!
//! Layers, later wins: built-in defaults, optional `meridian.toml` in the
//! working directory, environment variables (`.env` is loaded first by
//! `main`).
//!
//! | Variable | Default |
//! |----------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8000` |
//! | `DATABASE_URL` | `sqlite://meridian.db?mode=rwc` |
//! | `DATABASE_MAX_CONNECTIONS` | `5` |
//! | `SECRET_KEY` | random per process |
//! | `ACCESS_TOKEN_EXPIRE_MINUTES` | `10080` (7 days) |
//! | `BACKEND_CORS_ORIGINS` | empty (comma separated) |
//! | `FIRST_SUPERUSER` | `admin` |
//! | `FIRST_SUPERUSER_PASSWORD` | `admin123` |
//! | `API_V1_STR` | `/api/v1` |

use std::net::SocketAddr;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    /// HMAC key for access tokens.
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub backend_cors_origins: Vec<String>,
    pub first_superuser: String,
    pub first_superuser_password: String,
    /// Prefix every resource route is nested under.
    pub api_v1_str: String,
}

/// Shape of the merged sources before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawConfig {
    bind_addr: String,
    database_url: String,
    database_max_connections: u32,
    #[serde(default)]
    secret_key: Option<String>,
    access_token_expire_minutes: i64,
    #[serde(default)]
    backend_cors_origins: String,
    first_superuser: String,
    first_superuser_password: String,
    api_v1_str: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        RawConfig {
            bind_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite://meridian.db?mode=rwc".to_string(),
            database_max_connections: 5,
            secret_key: None,
            access_token_expire_minutes: 60 * 24 * 7,
            backend_cors_origins: String::new(),
            first_superuser: "admin".to_string(),
            first_superuser_password: "admin123".to_string(),
            api_v1_str: "/api/v1".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads defaults, then `meridian.toml` if present, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let merged = Config::builder()
            .add_source(Config::try_from(&RawConfig::default())?)
            .add_source(File::with_name("meridian").required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()?;

        let raw: RawConfig = merged.try_deserialize()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let bind_addr = raw
            .bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BIND_ADDR".to_string()))?;

        if raw.database_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()));
        }

        if raw.access_token_expire_minutes <= 0 {
            return Err(ConfigError::InvalidValue("ACCESS_TOKEN_EXPIRE_MINUTES".to_string()));
        }

        let api_v1_str = raw.api_v1_str.trim_end_matches('/').to_string();
        if !api_v1_str.starts_with('/') {
            return Err(ConfigError::InvalidValue("API_V1_STR".to_string()));
        }

        if raw.first_superuser.trim().is_empty() {
            return Err(ConfigError::MissingRequired("FIRST_SUPERUSER".to_string()));
        }

        let secret_key = match raw.secret_key.filter(|k| !k.is_empty()) {
            Some(key) => key,
            None => {
                warn!("SECRET_KEY not set, issued tokens will not survive a restart");
                format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
            }
        };

        Ok(ApiConfig {
            bind_addr,
            database_url: raw.database_url,
            database_max_connections: raw.database_max_connections,
            secret_key,
            access_token_expire_minutes: raw.access_token_expire_minutes,
            backend_cors_origins: split_origins(&raw.backend_cors_origins),
            first_superuser: raw.first_superuser,
            first_superuser_password: raw.first_superuser_password,
            api_v1_str,
        })
    }

    /// Defaults with a fixed secret and an in-memory database.
    pub fn for_tests() -> Self {
        let raw = RawConfig::default();
        ApiConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            secret_key: "test-secret".to_string(),
            access_token_expire_minutes: raw.access_token_expire_minutes,
            backend_cors_origins: Vec::new(),
            first_superuser: raw.first_superuser,
            first_superuser_password: raw.first_superuser_password,
            api_v1_str: raw.api_v1_str,
        }
    }
}

fn split_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_raw(RawConfig::default()).unwrap();
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.access_token_expire_minutes, 10_080);
        assert_eq!(config.api_v1_str, "/api/v1");
        assert!(config.backend_cors_origins.is_empty());
        assert!(!config.secret_key.is_empty());
    }

    #[test]
    fn test_cors_origins_split() {
        assert_eq!(
            split_origins("http://localhost:3000/, https://admin.example.com ,,"),
            ["http://localhost:3000", "https://admin.example.com"]
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_addr = RawConfig {
            bind_addr: "not-an-addr".to_string(),
            ..RawConfig::default()
        };
        assert!(matches!(
            ApiConfig::from_raw(bad_addr),
            Err(ConfigError::InvalidValue(ref key)) if key == "BIND_ADDR"
        ));

        let bad_expiry = RawConfig {
            access_token_expire_minutes: 0,
            ..RawConfig::default()
        };
        assert!(ApiConfig::from_raw(bad_expiry).is_err());
    }
}
