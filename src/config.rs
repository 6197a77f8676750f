//! Chef Server API configuration
//!
//! Layered, later wins:
//! 1. built-in defaults
//! 2. YAML file (`chefwiki.yaml` or `--config`)
//! 3. `CHEF_SERVER`, `CHEF_CLIENT`, `CHEF_VERSION`, `CHEF_TIMEOUT`
//! 4. explicit overrides from the command line

use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ChefError;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "chefwiki.yaml";

/// API connection settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// The URL for the Chef Server
    pub server: String,
    /// The name used when authenticating to a Chef Server
    pub client: String,
    /// The version of the Chef Server API that is being used
    pub version: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Private key for signed requests; signing is unsupported, so any
    /// value here fails validation
    pub key: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server: "https://chef-server".to_string(),
            client: "client".to_string(),
            version: "0.11.4".to_string(),
            timeout_secs: 30,
            key: None,
        }
    }
}

/// Top-level config file shape: settings live under `api:`
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    api: ApiConfig,
}

impl ApiConfig {
    /// Parse the `api:` section of a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, ChefError> {
        let file: ConfigFile = serde_yaml::from_str(yaml)?;
        Ok(file.api)
    }

    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ChefError> {
        let mut config = match path {
            Some(path) => Self::from_yaml(&std::fs::read_to_string(path)?)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_yaml(&std::fs::read_to_string(DEFAULT_CONFIG_FILE)?)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `CHEF_*` overrides from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ChefError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(server) = lookup("CHEF_SERVER") {
            self.server = server;
        }
        if let Some(client) = lookup("CHEF_CLIENT") {
            self.client = client;
        }
        if let Some(version) = lookup("CHEF_VERSION") {
            self.version = version;
        }
        if let Some(timeout) = lookup("CHEF_TIMEOUT") {
            self.timeout_secs = timeout.parse().map_err(|_| {
                ChefError::Config(format!("CHEF_TIMEOUT must be seconds, got '{}'", timeout))
            })?;
        }
        Ok(())
    }

    /// Check the settings are usable and return the parsed server URL
    pub fn validate(&self) -> Result<Url, ChefError> {
        let url = Url::parse(&self.server)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ChefError::Config(format!(
                "server must be an http(s) URL, got '{}'",
                self.server
            )));
        }
        if self.client.trim().is_empty() {
            return Err(ChefError::Config("client name is empty".to_string()));
        }
        if self.version.trim().is_empty() {
            return Err(ChefError::Config("API version is empty".to_string()));
        }
        if let Some(key) = &self.key {
            return Err(ChefError::Config(format!(
                "key '{}' is set but request signing is not supported; \
                 remove api.key and use a server that accepts unsigned requests \
                 (chef-zero) or a signing proxy",
                key.display()
            )));
        }
        Ok(url)
    }
}
