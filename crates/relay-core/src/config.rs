//! Configuration management for relay.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "relay.toml";

/// Startup errors the CLI reports without a backtrace
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} not found. Set it in the environment or in a .env file")]
    MissingCredential { var: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub tools: ToolSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Sandbox root every tool call is confined to
    pub working_dir: PathBuf,
    pub max_rounds: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Characters returned by a file read before truncation
    pub max_chars: usize,
    pub script_timeout_secs: u64,
    pub interpreter: String,
    /// Extension (without the dot) a runnable script must carry
    pub script_extension: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini-2.0-flash-001".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("./calculator"),
            max_rounds: 20,
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            max_chars: 10_000,
            script_timeout_secs: 30,
            interpreter: "python3".to_string(),
            script_extension: "py".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from an explicit path, or search the usual locations.
    ///
    /// A missing file is not an error when no explicit path is given; defaults
    /// are used instead.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::find_config_path() {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut settings: Self =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

        // A relative sandbox root belongs to the directory holding the file
        if settings.agent.working_dir.is_relative() {
            if let Some(base) = path.parent() {
                settings.agent.working_dir = base.join(&settings.agent.working_dir);
            }
        }

        tracing::debug!(
            path = %path.display(),
            working_dir = %settings.agent.working_dir.display(),
            "Loaded settings"
        );
        Ok(settings)
    }

    /// Find relay.toml in the current directory or its parents, then in the
    /// user config directory
    pub fn find_config_path() -> Option<PathBuf> {
        if let Ok(mut current) = std::env::current_dir() {
            for _ in 0..10 {
                let candidate = current.join(CONFIG_FILE);
                if candidate.is_file() {
                    return Some(candidate);
                }
                if !current.pop() {
                    break;
                }
            }
        }

        dirs::config_dir()
            .map(|dir| dir.join("relay").join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Read the model credential from the environment
    pub fn api_key(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.model.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingCredential {
                var: self.model.api_key_env.clone(),
            }),
        }
    }
}
