//! # Server Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHOPKEEP_BIND_ADDR, SHOPKEEP_PORT,                                 │
//! │     SHOPKEEP_DB_PATH, SHOPKEEP_DB_MAX_CONNECTIONS                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $SHOPKEEP_CONFIG, or shopkeep.toml in the platform config dir      │
//! │     ~/.config/shopkeep/shopkeep.toml (Linux)                           │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     0.0.0.0:5000, database in the platform data dir                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! bind_addr = "127.0.0.1"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/shopkeep/shop.db"
//! max_connections = 5
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use shopkeep_db::DbConfig;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// HTTP Settings
// =============================================================================

/// Where the HTTP server listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Bind address (default: 0.0.0.0 for all interfaces).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Port (default: 5000).
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl HttpSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Database Settings
// =============================================================================

/// SQLite file and pool sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file. Falls back to the platform data directory when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Seconds to wait for a free connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Seconds a sale waits for the write lock.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_busy_timeout() -> u64 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpSettings,

    #[serde(default)]
    pub database: DatabaseSettings,
}

impl ServerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (shopkeep.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let config_path = config_path
            .or_else(|| std::env::var_os("SHOPKEEP_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = config_path {
            if path.exists() {
                info!(?path, "Loading server config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document; missing sections and keys take their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("port must be greater than 0".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }

        Ok(())
    }

    /// Applies overrides from a key lookup (the process environment in
    /// [`ServerConfig::load`]).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("SHOPKEEP_BIND_ADDR") {
            debug!(addr = %addr, "Overriding bind address from environment");
            self.server.bind_addr = addr;
        }

        if let Some(port) = lookup("SHOPKEEP_PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => warn!(port = %port, "Ignoring invalid SHOPKEEP_PORT"),
            }
        }

        if let Some(path) = lookup("SHOPKEEP_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(max) = lookup("SHOPKEEP_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(m) => self.database.max_connections = m,
                Err(_) => warn!(value = %max, "Ignoring invalid SHOPKEEP_DB_MAX_CONNECTIONS"),
            }
        }
    }

    /// Resolves the database file path.
    ///
    /// ## Platform-Specific Defaults
    /// - **macOS**: `~/Library/Application Support/com.shopkeep.shopkeep/shopkeep.db`
    /// - **Linux**: `~/.local/share/shopkeep/shopkeep.db`
    /// - Fallback: `./shopkeep.db`
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database.path {
            return path.clone();
        }

        directories::ProjectDirs::from("com", "shopkeep", "shopkeep")
            .map(|dirs| dirs.data_dir().join("shopkeep.db"))
            .unwrap_or_else(|| PathBuf::from("shopkeep.db"))
    }

    /// Builds the pool configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path())
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
            .connect_timeout(Duration::from_secs(self.database.acquire_timeout_secs))
            .busy_timeout(Duration::from_secs(self.database.busy_timeout_secs))
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shopkeep", "shopkeep")
            .map(|dirs| dirs.config_dir().join("shopkeep.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.database.max_connections, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            [server]
            port = 8080

            [database]
            path = "/tmp/shop.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.database.min_connections, 1);
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SHOPKEEP_BIND_ADDR", "127.0.0.1"),
            ("SHOPKEEP_PORT", "9000"),
            ("SHOPKEEP_DB_PATH", "/data/override.db"),
            ("SHOPKEEP_DB_MAX_CONNECTIONS", "not-a-number"),
        ]);

        let mut config = ServerConfig::from_toml("[server]\nport = 8080\n").unwrap();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.database_path(), PathBuf::from("/data/override.db"));
        // Unparseable values are ignored
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_validation() {
        let mut config = ServerConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.database.min_connections = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(matches!(
            ServerConfig::from_toml("[server]\nport = \"eighty\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_db_config() {
        let mut config = ServerConfig::default();
        config.database.path = Some(PathBuf::from("/tmp/x.db"));
        config.database.max_connections = 8;

        let db = config.db_config();
        assert_eq!(db.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(db.max_connections, 8);
        assert_eq!(db.connect_timeout, Duration::from_secs(30));
        assert_eq!(db.busy_timeout, Duration::from_secs(5));
    }
}
