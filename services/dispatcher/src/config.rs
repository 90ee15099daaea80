//! Service configuration
//!
//! Settings are layered: built-in defaults first, then environment
//! variables. Variable names are the upper-case field names, e.g.
//! `DATABASE_URL`, `SESSION_BACKEND`, `DEBUG_SESSION`.

use common::{cache::RedisConfig, database::DatabaseConfig};
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

/// Where session contexts are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Redis,
    Memory,
}

/// Dispatcher settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Address the HTTP listener binds to
    pub bind_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    /// Pool acquire timeout in seconds
    pub database_connection_timeout: u64,
    pub redis_url: String,
    pub session_backend: SessionBackend,
    pub session_ttl_seconds: u64,
    pub session_cookie_name: String,
    /// Expose the `debugSession` method
    pub debug_session: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let database = DatabaseConfig::default();
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            database_url: database.database_url,
            database_max_connections: database.max_connections,
            database_min_connections: database.min_connections,
            database_connection_timeout: database.connection_timeout,
            redis_url: RedisConfig::default().url,
            session_backend: SessionBackend::Redis,
            session_ttl_seconds: 86_400,
            session_cookie_name: "session_id".to_string(),
            debug_session: false,
        }
    }
}

impl Settings {
    /// Load settings from defaults overlaid with the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            database_url: self.database_url.clone(),
            max_connections: self.database_max_connections,
            min_connections: self.database_min_connections,
            connection_timeout: self.database_connection_timeout,
        }
    }

    pub fn redis_config(&self) -> RedisConfig {
        RedisConfig {
            url: self.redis_url.clone(),
        }
    }
}
