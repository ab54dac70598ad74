//! Configuration management for QueryDesk.
//!
//! Handles loading configuration from TOML files and environment variables:
//! the backend location, the editor's starting statement, and the suggested
//! prompts offered on an empty conversation.

use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides the configured backend URL.
pub const API_URL_ENV: &str = "QUERYDESK_API_URL";

/// Backend base path used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Statement shown in the SQL editor on startup.
pub const DEFAULT_PLACEHOLDER_QUERY: &str = "SELECT * FROM Artist LIMIT 10;";

/// Main configuration structure for QueryDesk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// SQL editor settings.
    #[serde(default)]
    pub editor: EditorConfig,

    /// Conversation settings.
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base path both endpoints are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional HTTP client timeout. Absent means requests may wait indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Validates `base_url` and returns it without a trailing slash.
    pub fn normalized_base_url(&self) -> Result<String> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|e| DeskError::config(format!("Invalid base_url '{}': {e}", self.base_url)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(DeskError::config(format!(
                "Invalid scheme '{}' in base_url. Expected 'http' or 'https'",
                url.scheme()
            )));
        }

        Ok(url.as_str().trim_end_matches('/').to_string())
    }
}

/// SQL editor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Statement the editor starts with.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER_QUERY.to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
        }
    }
}

/// Conversation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Prompts offered as shortcuts while the transcript is empty.
    #[serde(default = "default_suggestions")]
    pub suggestions: Vec<String>,
}

fn default_suggestions() -> Vec<String> {
    [
        "Show me the top 5 selling artists",
        "Which genre has the most tracks?",
        "List albums from 2000 onwards",
        "Who are the top 3 customers by revenue?",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            suggestions: default_suggestions(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("querydesk")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DeskError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            DeskError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies the backend URL override with precedence:
    /// 1. `cli_url` (highest)
    /// 2. `QUERYDESK_API_URL` environment variable
    /// 3. the value already loaded from the file or defaults
    pub fn apply_api_url_override(&mut self, cli_url: Option<&str>) {
        if let Some(url) = cli_url {
            self.api.base_url = url.to_string();
        } else if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
    }
}
