//! Core module - shared infrastructure for sshpilot
//!
//! This module contains foundational types, configuration, and error
//! handling used throughout the application.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AgentConfig, Config, LlmConfig, SshConfig};
pub use error::{Result, SshPilotError};
pub use types::*;
