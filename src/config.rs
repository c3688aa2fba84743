use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Main configuration struct for the application
///
/// Holds the credentials and endpoints for both outbound APIs plus the
/// server bind address. Values come from an optional `config.toml` in the
/// platform config directory, overridden by environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub API token for authenticated requests
    pub github_token: Option<String>,
    /// Base URL of the GitHub REST API
    pub github_api_base: String,
    /// Credential for the language model backend
    pub llm_api_key: Option<String>,
    /// Base URL of the language model backend (chat-completions style)
    pub llm_base_url: String,
    /// Model identifier sent with each completion request
    pub llm_model: String,
    /// Address the HTTP server binds to
    pub bind_addr: String,
}

impl Config {
    /// Loads configuration from the default config file location
    ///
    /// If the config file doesn't exist, starts from the default
    /// configuration. Environment variables override file values either way.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ServiceError::Config(format!("Failed to read config file: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| ServiceError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Validates that configured API tokens are usable
    ///
    /// A missing token is allowed (unauthenticated GitHub access, local
    /// model backends); an empty one is a configuration mistake.
    pub fn ensure_tokens(&self) -> Result<()> {
        if let Some(token) = &self.github_token {
            if token.trim().is_empty() {
                return Err(ServiceError::new("GitHub token is empty"));
            }
        }
        if let Some(key) = &self.llm_api_key {
            if key.trim().is_empty() {
                return Err(ServiceError::new("LLM API key is empty"));
            }
        }
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Some(token) = get_env_value("GITHUB_TOKEN") {
            self.github_token = Some(token);
        }
        if let Some(base) = get_env_value("GITHUB_API_BASE") {
            self.github_api_base = base;
        }
        if let Some(key) = get_env_value("LLM_API_KEY") {
            self.llm_api_key = Some(key);
        }
        if let Some(base) = get_env_value("LLM_BASE_URL") {
            self.llm_base_url = base;
        }
        if let Some(model) = get_env_value("LLM_MODEL") {
            self.llm_model = model;
        }
        if let Some(addr) = get_env_value("REPOLENS_ADDR") {
            self.bind_addr = addr;
        }
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("repolens").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            github_api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            llm_api_key: None,
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

fn get_env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
