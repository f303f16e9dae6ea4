//! Configuration management.
//!
//! Settings come from, in order of precedence:
//!
//! 1. `ARTICLE_EATER_*` environment variables (nested keys use `__`, e.g.
//!    `ARTICLE_EATER_API__TIMEOUT_SECS=10`)
//! 2. a TOML config file (`--config`, `./article-eater.toml` or
//!    `<config dir>/article-eater/config.toml`)
//! 3. built-in defaults
//!
//! `ARTICLE_EATER_BASE_URL` and `ARTICLE_EATER_API_KEY` are shorthands for
//! `api.base_url` and `api.api_key` and beat every other source.

mod file_config;

pub use file_config::ConfigFileError;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_BASE_URL;
use crate::storage::{FileStore, CREDENTIAL_KEY};

/// Name of the config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "article-eater.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Where the credential is stored
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Origin of the backend, e.g. `http://localhost:8000`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Custom User-Agent header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Credential to use instead of the stored one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
            api_key: std::env::var("ARTICLE_EATER_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
        }
    }
}

fn default_base_url() -> String {
    std::env::var("ARTICLE_EATER_BASE_URL")
        .ok()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

fn default_timeout_secs() -> u64 {
    30
}

/// Credential storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage file; defaults to `<config dir>/article-eater/storage.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Key the credential is stored under
    #[serde(default = "default_credential_key")]
    pub credential_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            credential_key: default_credential_key(),
        }
    }
}

impl StorageConfig {
    /// The storage file actually used
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(FileStore::default_path)
    }
}

fn default_credential_key() -> String {
    CREDENTIAL_KEY.to_string()
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `text` (default) or `json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    build_config(Some(path), None)
}

/// Configuration from environment variables and defaults, without a file
pub fn get_config() -> Result<Config, config::ConfigError> {
    build_config(None, None)
}

/// Layer `path` (if any) under the `ARTICLE_EATER_*` environment.
///
/// `env` replaces the process environment when given.
fn build_config(
    path: Option<&Path>,
    env: Option<HashMap<String, String>>,
) -> Result<Config, config::ConfigError> {
    let lookup = |key: &str| -> Option<String> {
        match &env {
            Some(vars) => vars.get(key).cloned(),
            None => std::env::var(key).ok(),
        }
        .filter(|value| !value.is_empty())
    };
    let base_url = lookup("ARTICLE_EATER_BASE_URL");
    let api_key = lookup("ARTICLE_EATER_API_KEY");

    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    builder
        .add_source(
            config::Environment::with_prefix("ARTICLE_EATER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .set_override_option("api.base_url", base_url)?
        .set_override_option("api.api_key", api_key)?
        .build()?
        .try_deserialize()
}

/// Default location of the user config file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("article-eater")
        .join("config.toml")
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    [PathBuf::from(LOCAL_CONFIG_FILE), default_config_path()]
        .into_iter()
        .find(|path| path.is_file())
}
