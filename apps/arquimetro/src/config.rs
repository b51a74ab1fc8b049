//! # Configuration
//!
//! Settings come from an optional TOML file, then environment variables.
//!
//! ```toml
//! [storage]
//! database = "arquimetro.db"
//!
//! [server]
//! api_key = "secret"
//! cors_origins = "https://app.example.org"
//! rate_limit = 100
//!
//! [remote]
//! url = "https://backend.example.org/api"
//! api_key = "service-key"
//! timeout_ms = 10000
//! max_retries = 2
//! backoff_ms = 250
//! ```
//!
//! ## Environment Variables
//!
//! - `ARQUIMETRO_API_KEY`: bearer key required by the HTTP API
//! - `ARQUIMETRO_CORS_ORIGINS`: comma-separated origins, or "*" for all
//! - `ARQUIMETRO_RATE_LIMIT`: requests per second (0 disables)
//! - `ARQUIMETRO_REMOTE_URL`: switches the server to the hosted backend
//! - `ARQUIMETRO_REMOTE_KEY`: key sent to the hosted backend

use arquimetro_core::ArquimetroError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default rate limit: 100 requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Default database file.
pub const DEFAULT_DATABASE: &str = "arquimetro.db";

/// Maximum size of a configuration file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub database: Option<PathBuf>,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Required bearer key; `None` leaves the API open.
    pub api_key: Option<String>,
    /// `None` allows localhost only.
    pub cors_origins: Option<String>,
    pub rate_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            cors_origins: None,
            rate_limit: DEFAULT_RATE_LIMIT,
        }
    }
}

/// Hosted backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    /// Extra attempts for idempotent calls.
    pub max_retries: u32,
    /// Delay before the first retry; grows linearly.
    pub backoff_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            timeout_ms: 10_000,
            max_retries: 2,
            backoff_ms: 250,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Full application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub remote: Option<RemoteConfig>,
}

impl Config {
    /// Load the file at `path` (if any), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ArquimetroError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ArquimetroError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            ArquimetroError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ArquimetroError::DeserializationError(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            ArquimetroError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ArquimetroError> {
        toml::from_str(text)
            .map_err(|e| ArquimetroError::DeserializationError(format!("Invalid config: {}", e)))
    }

    /// Apply `ARQUIMETRO_*` variables from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable source. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("ARQUIMETRO_API_KEY") {
            self.server.api_key = Some(key);
        }
        if let Some(origins) = get("ARQUIMETRO_CORS_ORIGINS") {
            self.server.cors_origins = Some(origins);
        }
        if let Some(raw) = get("ARQUIMETRO_RATE_LIMIT") {
            match raw.trim().parse() {
                Ok(limit) => self.server.rate_limit = limit,
                Err(_) => tracing::warn!("Ignoring invalid ARQUIMETRO_RATE_LIMIT '{}'", raw),
            }
        }
        if let Some(url) = get("ARQUIMETRO_REMOTE_URL") {
            self.remote.get_or_insert_with(RemoteConfig::default).url = url;
        }
        if let Some(key) = get("ARQUIMETRO_REMOTE_KEY") {
            if let Some(remote) = self.remote.as_mut() {
                remote.api_key = Some(key);
            }
        }
    }

    /// Database path: explicit flag, then the file, then the default.
    pub fn database_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.storage.database.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }

    /// The hosted backend, when one is configured with a URL.
    pub fn remote(&self) -> Option<&RemoteConfig> {
        self.remote.as_ref().filter(|r| !r.url.trim().is_empty())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.rate_limit, DEFAULT_RATE_LIMIT);
        assert!(config.remote().is_none());
        assert_eq!(config.database_path(None), PathBuf::from(DEFAULT_DATABASE));
    }

    #[test]
    fn test_parse_toml() {
        let config = Config::from_toml_str(
            r#"
            [storage]
            database = "data/arq.db"

            [server]
            rate_limit = 5

            [remote]
            url = "http://backend.local"
            max_retries = 4
            "#,
        )
        .expect("parse");

        assert_eq!(config.server.rate_limit, 5);
        let remote = config.remote().expect("remote");
        assert_eq!(remote.max_retries, 4);
        assert_eq!(remote.timeout(), Duration::from_millis(10_000));
        assert_eq!(
            config.database_path(None),
            PathBuf::from("data/arq.db")
        );
        assert_eq!(
            config.database_path(Some(Path::new("flag.db"))),
            PathBuf::from("flag.db")
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = Config::from_toml_str("[server]\nport = 1\n");
        assert!(matches!(
            result,
            Err(ArquimetroError::DeserializationError(_))
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml_str("[server]\nrate_limit = 5\n").expect("parse");
        config.apply_overrides(env(&[
            ("ARQUIMETRO_RATE_LIMIT", "0"),
            ("ARQUIMETRO_API_KEY", "k"),
            ("ARQUIMETRO_REMOTE_URL", "http://remote"),
            ("ARQUIMETRO_REMOTE_KEY", "rk"),
            ("ARQUIMETRO_CORS_ORIGINS", ""),
        ]));

        assert_eq!(config.server.rate_limit, 0);
        assert_eq!(config.server.api_key.as_deref(), Some("k"));
        assert!(config.server.cors_origins.is_none());
        let remote = config.remote().expect("remote");
        assert_eq!(remote.url, "http://remote");
        assert_eq!(remote.api_key.as_deref(), Some("rk"));
    }

    #[test]
    fn test_invalid_rate_limit_ignored() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("ARQUIMETRO_RATE_LIMIT", "fast")]));
        assert_eq!(config.server.rate_limit, DEFAULT_RATE_LIMIT);
    }
}
