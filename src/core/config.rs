//! Configuration management for sshpilot
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/sshpilot/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, SshPilotError};

/// Main configuration for sshpilot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chat API configuration
    pub llm: LlmConfig,
    /// Remote host configuration
    pub ssh: SshConfig,
    /// Agent loop configuration
    pub agent: AgentConfig,
}

/// Chat API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat-completions API
    pub base_url: String,
    /// API key; absent keys surface as an LLM error on first call
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
}

/// Remote host connection configuration
///
/// Replaces implicit environment lookups at call sites: the executor
/// receives this object explicitly and `validate` runs before the first
/// connection attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshConfig {
    /// Target host address
    pub host: String,
    /// SSH port (default: 22)
    pub port: u16,
    /// Login username
    pub username: String,
    /// Password credential
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Private key path credential; tried before the password when both
    /// are set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_path: Option<String>,
    /// TCP connect / handshake timeout in milliseconds
    pub connect_timeout_ms: u64,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum transcript length before the loop is forced to stop
    /// Default: 10
    pub max_turns: usize,
    /// Whether to show debug output
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            ssh: SshConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://open.bigmodel.cn/api/paas/v4".to_string()),
            api_key: env::var("LLM_API_KEY")
                .or_else(|_| env::var("ZHIPUAI_API_KEY"))
                .ok(),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| "glm-4-plus".to_string()),
            timeout_secs: 120,
            temperature: 0.3,
        }
    }
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            host: env::var("SSH_HOST").unwrap_or_default(),
            port: env::var("SSH_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(22),
            username: env::var("SSH_USERNAME").unwrap_or_default(),
            password: env::var("SSH_PASSWORD").ok(),
            key_path: env::var("SSH_KEY_PATH").ok(),
            connect_timeout_ms: 10_000,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: 10,
            debug: env::var("SSHPILOT_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sshpilot")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Load .env if present; missing values are not fatal here
        let _ = dotenvy::dotenv();

        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(SshPilotError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| SshPilotError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| SshPilotError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| SshPilotError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SshPilotError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| SshPilotError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }
}

impl SshConfig {
    /// Get the socket address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check the fields the transport cannot work without
    ///
    /// Called by the executor before its first connection attempt, so a
    /// half-configured environment fails with a typed error instead of a
    /// connect timeout to nowhere.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(SshPilotError::config(
                "SSH host is not set (SSH_HOST or [ssh] host in config.toml)",
            ));
        }
        if self.username.trim().is_empty() {
            return Err(SshPilotError::config(
                "SSH username is not set (SSH_USERNAME or [ssh] username in config.toml)",
            ));
        }
        if self.password.is_none() && self.key_path.is_none() {
            return Err(SshPilotError::config(
                "No SSH credential: set SSH_PASSWORD or SSH_KEY_PATH",
            ));
        }
        Ok(())
    }
}
