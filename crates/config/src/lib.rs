//! Configuration loading, validation, and management for Troupe.
//!
//! Loads configuration from `~/.troupe/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.troupe/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per model reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Reasoning agent settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Orchestrator strategy settings
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Debate strategy settings
    #[serde(default)]
    pub debate: DebateConfig,

    /// Custom roles, added to (or overriding) the built-in catalogue
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RoleConfig>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    2048
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("agent", &self.agent)
            .field("orchestrator", &self.orchestrator)
            .field("debate", &self.debate)
            .field("roles", &self.roles)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// "function_calling" or "text_parsing"
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Hard ceiling on model calls per query
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// User/assistant pairs kept in each agent's history
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

fn default_mode() -> String {
    "function_calling".into()
}
fn default_max_steps() -> u32 {
    10
}
fn default_history_turns() -> usize {
    20
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            max_steps: default_max_steps(),
            history_turns: default_history_turns(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default = "default_max_replan")]
    pub max_replan: u32,
}

fn default_max_replan() -> u32 {
    2
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_replan: default_max_replan(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateConfig {
    /// Debate rounds, not counting the judge's verdict
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

fn default_max_rounds() -> u32 {
    2
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
        }
    }
}

/// A role declared in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub system_prompt: String,

    /// Names of the tools this role may call
    #[serde(default)]
    pub tools: Vec<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.troupe/config.toml).
    ///
    /// Environment variables take priority over the file:
    /// - `TROUPE_API_KEY`, then `OPENAI_API_KEY` (only when the file has no key)
    /// - `OPENAI_BASE_URL`
    /// - `OPENAI_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_path())
    }

    /// Load `path`, then apply the same environment overrides as [`load`](Self::load).
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("TROUPE_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }
        if let Some(base_url) = lookup("OPENAI_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".troupe")
    }

    /// Path of the default config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.agent.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_steps must be at least 1".into(),
            ));
        }
        if self.agent.history_turns == 0 {
            return Err(ConfigError::ValidationError(
                "agent.history_turns must be at least 1".into(),
            ));
        }
        if self.debate.max_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "debate.max_rounds must be at least 1".into(),
            ));
        }

        let mut seen = HashSet::new();
        for role in &self.roles {
            if role.name.trim().is_empty() {
                return Err(ConfigError::ValidationError("role name must not be empty".into()));
            }
            if !seen.insert(role.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "role '{}' is declared more than once",
                    role.name
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            agent: AgentConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            debate: DebateConfig::default(),
            roles: vec![],
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
