//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Command-line arguments

use crate::error::{Error, Result};
use courier_core::{ClientConfig, ResponseFormat, RetryPolicy, StatusPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults applied to every request
    pub client: ClientDefaults,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Request defaults shared by every command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientDefaults {
    /// User-Agent sent when a request sets none
    pub user_agent: Option<String>,

    /// Per-attempt timeout in milliseconds
    pub timeout_ms: Option<u64>,

    /// Retries after a failed attempt
    pub retry: u32,

    /// Delay before each retry in milliseconds
    pub retry_delay_ms: u64,

    /// Verify TLS certificates and hostnames
    pub verify_ssl: bool,

    /// Follow redirects by default
    pub follow_redirects: bool,

    /// Redirect limit when following
    pub max_redirects: u32,

    /// Proxy URI
    pub proxy: Option<String>,

    /// Default response decoding
    pub response_format: ResponseFormat,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Per-module level overrides, e.g. `courier_core: debug`
    pub modules: BTreeMap<String, String>,
}

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_ms: None,
            retry: 0,
            retry_delay_ms: 1000,
            verify_ssl: true,
            follow_redirects: false,
            max_redirects: 5,
            proxy: None,
            response_format: ResponseFormat::Auto,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress: true,
        }
    }
}

/// Supported configuration file syntaxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
    Toml,
}

impl FileFormat {
    /// Pick the syntax from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("toml") => FileFormat::Toml,
            _ => FileFormat::Json,
        }
    }

    fn name(self) -> &'static str {
        match self {
            FileFormat::Json => "JSON",
            FileFormat::Yaml => "YAML",
            FileFormat::Toml => "TOML",
        }
    }
}

/// Read a JSON, YAML or TOML file into `T`, choosing the syntax by extension
pub fn read_structured<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let format = FileFormat::from_path(path);
    let parsed = match format {
        FileFormat::Json => serde_json::from_str(&content).map_err(anyhow::Error::from),
        FileFormat::Yaml => serde_yaml::from_str(&content).map_err(anyhow::Error::from),
        FileFormat::Toml => toml::from_str(&content).map_err(anyhow::Error::from),
    };

    parsed.map_err(|e| Error::InvalidFormat {
        path: path.to_path_buf(),
        expected: format.name().to_string(),
        source: Some(e),
    })
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        read_structured(path)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for ext in ["yaml", "json", "toml"] {
            paths.push(PathBuf::from(format!(".courier.{}", ext)));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let courier_dir = config_dir.join("courier");
            for ext in ["yaml", "json", "toml"] {
                paths.push(courier_dir.join(format!("config.{}", ext)));
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            for ext in ["yaml", "json", "toml"] {
                paths.push(home_dir.join(format!(".courier.{}", ext)));
            }
        }

        paths
    }

    /// Client configuration derived from the request defaults
    pub fn client_config(&self, status_policy: StatusPolicy) -> ClientConfig {
        let defaults = &self.client;
        let mut config = ClientConfig {
            timeout: defaults.timeout_ms.map(Duration::from_millis),
            retry_policy: RetryPolicy::new(
                defaults.retry,
                Duration::from_millis(defaults.retry_delay_ms),
            ),
            verify_ssl: defaults.verify_ssl,
            max_redirects: defaults.follow_redirects.then_some(defaults.max_redirects),
            proxy: defaults.proxy.clone(),
            format: defaults.response_format,
            status_policy,
            ..ClientConfig::default()
        };
        if let Some(user_agent) = &defaults.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_client_defaults() {
        let config = Config::default().client_config(StatusPolicy::TransportOnly);
        let client = ClientConfig::default();

        assert_eq!(config.user_agent, client.user_agent);
        assert_eq!(config.retry_policy, client.retry_policy);
        assert_eq!(config.max_redirects, None);
        assert!(config.verify_ssl);
    }

    #[test]
    fn test_yaml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "client:\n  retry: 2\n  retry_delay_ms: 250\n  follow_redirects: true\n  response_format: json\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.client.retry, 2);
        assert_eq!(config.client.max_redirects, 5);

        let client = config.client_config(StatusPolicy::ErrorStatusFails);
        assert_eq!(client.retry_policy.retries, 2);
        assert_eq!(client.retry_policy.delay, Duration::from_millis(250));
        assert_eq!(client.max_redirects, Some(5));
        assert_eq!(client.format, ResponseFormat::Json);
        assert_eq!(client.status_policy, StatusPolicy::ErrorStatusFails);
    }

    #[test]
    fn test_logging_module_levels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "logging:\n  level: info\n  modules:\n    courier_core: debug\n    reqwest: warn\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.logging.level.as_deref(), Some("info"));
        assert_eq!(
            config.logging.modules.get("courier_core").map(String::as_str),
            Some("debug")
        );
        assert_eq!(config.logging.modules.len(), 2);
    }

    #[test]
    fn test_toml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[client]\nuser_agent = \"probe/2\"\nverify_ssl = false\n\n[output]\ncolor = false\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.client.user_agent.as_deref(), Some("probe/2"));
        assert!(!config.client.verify_ssl);
        assert!(!config.output.color);
        assert_eq!(
            config.client_config(StatusPolicy::TransportOnly).user_agent,
            "probe/2"
        );
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        assert!(matches!(
            Config::from_file(&missing),
            Err(Error::FileNotFound { .. })
        ));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[client\n").unwrap();
        assert!(matches!(
            Config::from_file(&broken),
            Err(Error::InvalidFormat { expected, .. }) if expected == "TOML"
        ));
    }
}
