use std::path::Path;
use std::time::Duration;

use duindex::BuildOptions;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const FALLBACK_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings read from the optional JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub index: IndexConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Basic authentication; disabled when absent.
    pub auth: Option<AuthConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            auth: None,
        }
    }
}

impl ServerConfig {
    /// Fills in an empty host or port and checks the credentials.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            self.host = FALLBACK_HOST.to_string();
        }
        if self.port == 0 {
            self.port = DEFAULT_PORT;
        }
        if let Some(auth) = &self.auth {
            if auth.user.is_empty() || auth.password.is_empty() {
                return Err(ConfigError::Invalid(
                    "user and password are both required when auth is enabled".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexConfig {
    /// Path prefixes dropped while loading, e.g. `./node_modules/*`.
    pub ignore: Vec<String>,
    pub strict: bool,
    pub min_block_kb: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let defaults = BuildOptions::default();
        Self {
            ignore: defaults.ignore,
            strict: defaults.strict,
            min_block_kb: defaults.min_block_kb,
        }
    }
}

impl IndexConfig {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            ignore: self.ignore.clone(),
            strict: self.strict,
            min_block_kb: self.min_block_kb,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    pub capacity: u64,
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: duindex::provider::DEFAULT_CACHE_CAPACITY,
            ttl_seconds: duindex::provider::DEFAULT_CACHE_TTL.as_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}
