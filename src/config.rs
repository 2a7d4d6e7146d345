//! Configuration module
//!
//! Settings are read from a TOML file. A missing file is created with the
//! defaults so operators have something to edit.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! shutdown_timeout = 30
//!
//! [database]
//! backend = "sqlite"
//! path = "./parking.db"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//!
//! [rate_limit]
//! cooldown_secs = 10
//! retention_secs = 600
//!
//! [seed]
//! enabled = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::RateLimitConfig;
use crate::infrastructure::DatabaseConfig;

/// Environment variable holding an alternative config path
pub const CONFIG_ENV: &str = "PARKING_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// `~/.config/parking-iot/config.toml`, or `$PARKING_CONFIG` when set
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parking-iot")
        .join("config.toml")
}

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub logging: LoggingConfig,
    pub rate_limit: RateLimitSettings,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub backend: StorageBackend,
    /// SQLite file, used when `url` is not set
    pub path: String,
    /// Full connection URL, takes precedence over `path`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            path: "./parking.db".to_string(),
            url: None,
        }
    }
}

impl DatabaseSettings {
    pub fn connection_url(&self) -> String {
        match (&self.backend, &self.url) {
            (StorageBackend::Memory, _) => "memory".to_string(),
            (StorageBackend::Sqlite, Some(url)) => url.clone(),
            (StorageBackend::Sqlite, None) => DatabaseConfig::sqlite(&self.path).url,
        }
    }

    /// SeaORM connection settings; `None` for the in-memory backend
    pub fn database_config(&self) -> Option<DatabaseConfig> {
        match (&self.backend, &self.url) {
            (StorageBackend::Memory, _) => None,
            (StorageBackend::Sqlite, Some(url)) if url.contains(":memory:") => Some(DatabaseConfig {
                url: url.clone(),
                ..DatabaseConfig::sqlite_memory()
            }),
            (StorageBackend::Sqlite, Some(url)) => Some(DatabaseConfig {
                url: url.clone(),
                ..DatabaseConfig::default()
            }),
            (StorageBackend::Sqlite, None) => Some(DatabaseConfig::sqlite(&self.path)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub cooldown_secs: u64,
    pub retention_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            cooldown_secs: 10,
            retention_secs: 600,
        }
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            cooldown: Duration::from_secs(settings.cooldown_secs),
            retention: Duration::from_secs(settings.retention_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Load demo spots and devices into an empty store on startup
    pub enabled: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    /// Load from `path`, writing the defaults there first when the file is missing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw).map_err(io_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if self.rate_limit.retention_secs < self.rate_limit.cooldown_secs {
            return Err(ConfigError::Invalid(
                "rate_limit.retention_secs must not be shorter than cooldown_secs".into(),
            ));
        }
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => Ok(()),
            other => Err(ConfigError::Invalid(format!(
                "logging.format must be \"json\" or \"pretty\", got \"{}\"",
                other
            ))),
        }
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig::from(&self.rate_limit)
    }
}
