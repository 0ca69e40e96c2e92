use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::auth::PasswordScheme;
use crate::error::{CollegeMapError, Result};
use crate::events::MAX_KEEP_ALIVE;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: HttpConfig,
    pub session: SessionConfig,
    pub password: PasswordConfig,
    pub events: EventsConfig,
    pub storage: StorageConfig,
    pub map: MapConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub max_age_days: u32,
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".to_string(),
            max_age_days: 30,
            secure: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub scheme: PasswordScheme,
    pub cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            scheme: PasswordScheme::Bcrypt,
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Per-subscriber queue length; a subscriber that falls this far behind
    /// is disconnected.
    pub channel_capacity: usize,
    pub keep_alive_secs: u64,
}

impl EventsConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            keep_alive_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub mongodb_uri: String,
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            database: "college_map".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub name: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            name: "College Map".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_secs: 60,
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CollegeMapError::Config(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).map_err(|e| {
            CollegeMapError::Config(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Applies `SERVER_HOST`, `SERVER_PORT`, `STORAGE_BACKEND`, `MONGODB_URI`,
    /// `DATABASE_NAME` and `SESSION_MAX_AGE_DAYS` on top of the file values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            self.server.port = parse_env("SERVER_PORT", &port)?;
        }
        if let Ok(backend) = std::env::var("STORAGE_BACKEND") {
            self.storage.backend = match backend.to_ascii_lowercase().as_str() {
                "memory" => StorageBackend::Memory,
                "mongodb" => StorageBackend::Mongodb,
                other => {
                    return Err(CollegeMapError::Config(format!(
                        "Unknown STORAGE_BACKEND '{other}'"
                    )))
                }
            };
        }
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            self.storage.mongodb_uri = uri;
        }
        if let Ok(database) = std::env::var("DATABASE_NAME") {
            self.storage.database = database;
        }
        if let Ok(days) = std::env::var("SESSION_MAX_AGE_DAYS") {
            self.session.max_age_days = parse_env("SESSION_MAX_AGE_DAYS", &days)?;
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.events.channel_capacity == 0 {
            return Err(CollegeMapError::Config(
                "events.channel_capacity must be greater than zero".to_string(),
            ));
        }
        if self.events.keep_alive_secs == 0 {
            return Err(CollegeMapError::Config(
                "events.keep_alive_secs must be greater than zero".to_string(),
            ));
        }
        if self.events.keep_alive_secs > MAX_KEEP_ALIVE.as_secs() {
            return Err(CollegeMapError::Config(format!(
                "events.keep_alive_secs must be at most {}",
                MAX_KEEP_ALIVE.as_secs()
            )));
        }
        if self.session.max_age_days == 0 {
            return Err(CollegeMapError::Config(
                "session.max_age_days must be greater than zero".to_string(),
            ));
        }
        if self.session.cookie_name.is_empty() {
            return Err(CollegeMapError::Config(
                "session.cookie_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| CollegeMapError::Config(format!("Invalid value for {name}: '{raw}'")))
}
