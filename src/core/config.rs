//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Name of the project-local config file
pub const LOCAL_CONFIG_FILE: &str = ".innkeeper.yaml";

/// Errors that can occur while reading an explicit config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Innkeeper configuration with layered hierarchy
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the marketplace REST backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Identity stamped as `createdBy` when no session user is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (accessors below)

        // 2. Global user config (~/.config/innkeeper/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Ok(global) = Self::from_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project-local config (./.innkeeper.yaml)
        if let Ok(local) = Self::from_file(Path::new(LOCAL_CONFIG_FILE)) {
            config.merge(local);
        }

        // 4. Environment variables
        config.merge(Self::from_env());

        config
    }

    /// Read a single config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn from_env() -> Self {
        Config {
            api_url: std::env::var("INNKEEPER_API_URL").ok(),
            author: std::env::var("INNKEEPER_AUTHOR").ok(),
            timeout_secs: std::env::var("INNKEEPER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "innkeeper")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }

    /// Backend base URL, always ending in `/` so endpoint paths join below it
    pub fn api_url(&self) -> String {
        let url = self
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if url.ends_with('/') {
            url
        } else {
            format!("{}/", url)
        }
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Get the author name, falling back to the OS username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            api_url: Some("https://a.example/api".to_string()),
            author: Some("alice".to_string()),
            timeout_secs: None,
        };
        base.merge(Config {
            api_url: Some("https://b.example/api/".to_string()),
            author: None,
            timeout_secs: Some(5),
        });
        assert_eq!(base.api_url(), "https://b.example/api/");
        assert_eq!(base.author(), "alice");
        assert_eq!(base.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_api_url_gets_trailing_slash() {
        let config = Config {
            api_url: Some("https://stay.example/api".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_url(), "https://stay.example/api/");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "api_url: https://stay.example/api/\ntimeout_secs: 12\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://stay.example/api/"));
        assert_eq!(config.timeout_secs, Some(12));
        assert!(config.author.is_none());
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "timeout_secs: [not, a, number]\n").unwrap();

        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
