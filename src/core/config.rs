//! Configuration management for Delegator
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/delegator/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{DelegatorError, Result};

/// Default system prompt for top-level agents
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an intelligent agent, tasked with fulfilling users' requests. \
Use appropriate tools reasonably, plan before execution when faced with complex tasks, \
and if necessary, delegate parts of the task to other agents with the `task` tool.";

/// Main configuration for Delegator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model endpoint configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// Agent configuration
    #[serde(default)]
    pub agent: AgentConfig,
}

/// OpenAI-compatible endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the chat completions API
    pub base_url: String,
    /// Bearer token, if the endpoint needs one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model name sent with every request
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// System prompt for the top-level agent
    pub system_prompt: String,
    /// Maximum model round-trips per agent before giving up
    /// Default: 25
    pub max_turns: usize,
    /// Maximum sub-agent nesting depth (0 disables delegation)
    /// Default: 3
    pub max_depth: usize,
    /// Ceiling for shell commands run by the `cmd` tool
    /// Default: 30
    pub tool_timeout_secs: u64,
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("DELEGATOR_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            api_key: env::var("DELEGATOR_API_KEY")
                .or_else(|_| env::var("OPENAI_API_KEY"))
                .ok(),
            model: env::var("DELEGATOR_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            timeout_secs: 120,
            temperature: None,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_turns: env::var("DELEGATOR_MAX_TURNS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(25),
            max_depth: env::var("DELEGATOR_MAX_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            tool_timeout_secs: 30,
            log_level: env::var("DELEGATOR_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

/// Bounds every agent in a delegation tree shares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Model round-trips allowed per agent
    pub max_turns: usize,
    /// Deepest sub-agent level allowed
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_turns: 25,
            max_depth: 3,
        }
    }
}

impl From<&AgentConfig> for Limits {
    fn from(agent: &AgentConfig) -> Self {
        Self {
            max_turns: agent.max_turns,
            max_depth: agent.max_depth,
        }
    }
}

impl Config {
    /// Turn and depth limits for agents built from this configuration
    pub fn limits(&self) -> Limits {
        Limits::from(&self.agent)
    }

    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("delegator")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    ///
    /// A missing config file means defaults. A file that exists but cannot be
    /// read or parsed is an error.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Ok(Self::load_from(&Self::config_file())?.unwrap_or_default())
    }

    /// Load configuration from `path`, or `None` if there is no such file
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DelegatorError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map(Some).map_err(|e| {
            DelegatorError::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Parse configuration from TOML text; missing sections fall back to defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DelegatorError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_file();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save configuration to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.exists()) {
            fs::create_dir_all(dir).map_err(|e| {
                DelegatorError::config(format!("Failed to create config dir: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| DelegatorError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| DelegatorError::config(format!("Failed to write config: {}", e)))
    }

    /// Completions endpoint derived from the base URL
    pub fn completions_url(&self) -> Result<url::Url> {
        let mut base = self.model.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base = url::Url::parse(&base)
            .map_err(|e| DelegatorError::config(format!("Invalid base_url '{}': {}", base, e)))?;
        base.join("chat/completions")
            .map_err(|e| DelegatorError::config(format!("Invalid base_url: {}", e)))
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}
