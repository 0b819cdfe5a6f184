//! Process-level settings for the portal binary.
//!
//! Everything the API itself needs lives in [`ApiConfig`]; this module
//! adds the listener address, storage backend selection, seeding and
//! log output format.

use crave_api::config::{ApiConfig, ConfigError, non_empty, parse_flag, parse_or};
use crave_api::server::ServerConfig;

/// Default pool size when `DATABASE_URL` is set.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(raw: Option<String>) -> Result<Self, ConfigError> {
        let Some(value) = non_empty(raw) else {
            return Ok(Self::default());
        };
        match value.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::Invalid {
                name: "LOG_FORMAT",
                reason: format!("{value:?} is not one of text, json"),
            }),
        }
    }
}

/// All settings read at startup.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Listener address.
    pub server: ServerConfig,
    /// `PostgreSQL` URL; `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Pool size for the `PostgreSQL` backend.
    pub max_connections: u32,
    /// Load the development catalog into an empty store.
    pub seed_data: bool,
    /// Log line format.
    pub log_format: LogFormat,
    /// Settings handed to the API.
    pub api: ApiConfig,
}

impl ServerSettings {
    /// Read settings from the process environment.
    ///
    /// Besides the variables documented on [`ApiConfig::from_env`]:
    /// - `HOST` / `PORT` -- listener address (default `0.0.0.0:5000`)
    /// - `DATABASE_URL` -- use `PostgreSQL` (default: in-memory store)
    /// - `DATABASE_MAX_CONNECTIONS` -- pool size (default `10`)
    /// - `SEED_DATA` -- seed an empty catalog (default `true`)
    /// - `LOG_FORMAT` -- `text` or `json` (default `text`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();
        let server = ServerConfig {
            host: non_empty(lookup("HOST")).unwrap_or(defaults.host),
            port: parse_or("PORT", lookup("PORT"), defaults.port)?,
        };

        let max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            lookup("DATABASE_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                reason: String::from("must be at least 1"),
            });
        }

        Ok(Self {
            server,
            database_url: non_empty(lookup("DATABASE_URL")),
            max_connections,
            seed_data: parse_flag("SEED_DATA", lookup("SEED_DATA"), true)?,
            log_format: LogFormat::parse(lookup("LOG_FORMAT"))?,
            api: ApiConfig::from_lookup(&lookup)?,
        })
    }
}
