//! Configuration loading and validation.
//!
//! TOML configuration with sensible defaults; `load_config_or_default`
//! probes the usual locations and falls back to defaults when nothing is
//! found.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub database: DatabaseConfig,
}

/// Metadata provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the provider API.
    pub server: String,
    /// API version path segment.
    pub api_version: String,
    /// API key appended to requests.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            server: "http://api.rottentomatoes.com/api/public".to_string(),
            api_version: "v1.0".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Cache database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite cache file.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "./reelcache.sqlite".to_string(),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./reelcache.toml",
        "~/.config/reelcache/config.toml",
        "/etc/reelcache/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.provider.server.is_empty() {
        anyhow::bail!("Provider server URL cannot be empty");
    }
    if config.provider.timeout_secs == 0 {
        anyhow::bail!("Provider timeout cannot be 0");
    }
    if config.database.path.is_empty() {
        anyhow::bail!("Database path cannot be empty");
    }
    if config.provider.api_key.is_empty() {
        tracing::warn!("No provider API key configured; online lookups will likely be rejected");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.provider.api_version, "v1.0");
        assert_eq!(config.provider.timeout_secs, 30);
        assert_eq!(config.database.path, "./reelcache.sqlite");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [provider]
            api_key = "secret"

            [database]
            path = "/var/lib/reelcache/cache.sqlite"
            "#,
        )
        .unwrap();
        assert_eq!(config.provider.api_key, "secret");
        assert_eq!(
            config.provider.server,
            "http://api.rottentomatoes.com/api/public"
        );
        assert_eq!(config.database.path, "/var/lib/reelcache/cache.sqlite");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = Config::default();
        config.provider.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reelcache.toml");
        std::fs::write(&path, "[provider]\napi_key = \"k\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.provider.api_key, "k");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = load_config(Path::new("/nonexistent/reelcache.toml"));
        assert!(err.is_err());
    }
}
