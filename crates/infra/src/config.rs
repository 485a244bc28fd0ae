//! Environment configuration.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `DATABASE_URL` | `sqlite://warehouse.db?mode=rwc` | SQLite connection string |
//! | `WAREHOUSE_STORE` | `sqlite` | `sqlite` or `memory` |
//! | `BIND_ADDR` | `0.0.0.0:5000` | HTTP listen address |
//! | `LOG_FORMAT` | `json` | `json` or `pretty` |
//!
//! A `.env` file in the working directory is loaded first when present;
//! variables already set in the process environment win.

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use stockroom_observability::LogFormat;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://warehouse.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Which [`WarehouseStore`](crate::store::WarehouseStore) implementation backs the service.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" | "in-memory" | "in_memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid {
                key: "WAREHOUSE_STORE",
                value: s.to_string(),
                reason: "expected `sqlite` or `memory`".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: `{value}` ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to load .env file: {0}")]
    DotEnv(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub store: StoreBackend,
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load `.env` (if any), then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(ConfigError::DotEnv(e.to_string())),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let store = match get("WAREHOUSE_STORE") {
            Some(raw) => raw.parse()?,
            None => StoreBackend::default(),
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.trim().parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| ConfigError::Invalid {
                key: "LOG_FORMAT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            database_url,
            store,
            bind_addr,
            log_format,
        })
    }
}
