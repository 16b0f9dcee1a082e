//! Configuration management for Weekly Byte.
//!
//! Loads configuration from ${BYTE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::item::BucketKind;

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for Weekly Byte configuration and data files.
    //!
    //! BYTE_HOME resolution order:
    //! 1. BYTE_HOME environment variable (if set)
    //! 2. ~/.config/byte (default)

    use std::path::PathBuf;

    /// Returns the Weekly Byte home directory.
    pub fn byte_home() -> PathBuf {
        if let Ok(home) = std::env::var("BYTE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".byte"),
            |h| h.join(".config").join("byte"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        byte_home().join("config.toml")
    }

    /// Returns the path to the UI preferences file.
    pub fn preferences_path() -> PathBuf {
        byte_home().join("preferences.toml")
    }

    /// Returns the directory for rolling log files.
    pub fn logs_dir() -> PathBuf {
        byte_home().join("logs")
    }
}

/// Endpoint paths, relative to `base_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub posts: String,
    pub events: String,
    pub external_events: String,
    pub digest: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            posts: "rss-updates".to_string(),
            events: "events".to_string(),
            external_events: "external-events".to_string(),
            digest: "send-newsletter".to_string(),
        }
    }
}

impl EndpointsConfig {
    /// Read endpoint for a bucket.
    pub fn for_bucket(&self, kind: BucketKind) -> &str {
        match kind {
            BucketKind::Posts => &self.posts,
            BucketKind::Events => &self.events,
            BucketKind::ExternalEvents => &self.external_events,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter (e.g. "warn", "info", "byte_core=debug")
    pub level: String,
    /// Write to a daily rolling file under $BYTE_HOME/logs instead of stderr
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: false,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend serving the feeds and the digest endpoint
    pub base_url: String,

    /// Shared deadline for the feed load and the digest send, in seconds
    pub fetch_timeout_secs: u64,

    /// Notification lifetime in seconds
    pub notification_secs: u64,

    #[serde(default)]
    pub endpoints: EndpointsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            fetch_timeout_secs: Self::DEFAULT_FETCH_TIMEOUT_SECS,
            notification_secs: Self::DEFAULT_NOTIFICATION_SECS,
            endpoints: EndpointsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    const DEFAULT_BASE_URL: &str =
        "https://rss-feed-backend-e6gvd8bnfugscucb.canadacentral-01.azurewebsites.net";
    const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_NOTIFICATION_SECS: u64 = 3;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Base URL to use, preferring `BYTE_BASE_URL` over the config file.
    pub fn effective_base_url(&self) -> String {
        std::env::var("BYTE_BASE_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.base_url.trim().to_string())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.notification_ttl(), Duration::from_secs(3));
        assert_eq!(config.endpoints.digest, "send-newsletter");
    }

    /// Template and Rust defaults must agree.
    #[test]
    fn test_template_matches_defaults() {
        let parsed: Config = toml::from_str(default_config_template()).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.base_url, defaults.base_url);
        assert_eq!(parsed.fetch_timeout_secs, defaults.fetch_timeout_secs);
        assert_eq!(parsed.notification_secs, defaults.notification_secs);
        assert_eq!(parsed.endpoints, defaults.endpoints);
        assert_eq!(parsed.logging, defaults.logging);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "fetch_timeout_secs = 5\n[endpoints]\nexternal_events = \"ext\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.fetch_timeout_secs, 5);
        assert_eq!(config.notification_secs, 3);
        assert_eq!(config.endpoints.for_bucket(BucketKind::ExternalEvents), "ext");
        assert_eq!(config.endpoints.for_bucket(BucketKind::Posts), "rss-updates");
    }

    #[test]
    fn test_init_writes_template() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::init(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("# Weekly Byte Configuration"));
        assert!(contents.contains("fetch_timeout_secs = 30"));
    }

    /// Config init: fails if file exists (no silent overwrite).
    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        assert!(Config::init(&path).is_err());
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "fetch_timeout_secs = \"soon\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }
}
