//! Custom error types for sshpilot
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for sshpilot operations
#[derive(Error, Debug)]
pub enum SshPilotError {
    /// Transport or auth handshake failure — the session never came up
    #[error("Connection error: {0}")]
    Connection(String),

    /// Command could not be dispatched once connected
    #[error("Execution error: {0}")]
    Execution(String),

    /// Chat API connection or protocol errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for sshpilot operations
pub type Result<T> = std::result::Result<T, SshPilotError>;

impl SshPilotError {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create an execution error
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

// Note: a non-zero remote exit status is deliberately NOT an error
// variant. It travels as data in `ExecutionResult` and is forwarded to
// the model and the caller unchanged.
