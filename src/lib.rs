//! sshpilot - LLM-driven remote command execution over SSH
//!
//! A small agent that turns one natural-language instruction into a
//! vetted remote shell command: the chat model replies with a single
//! `{"command": "..."}` object, sshpilot runs it on the configured host
//! over SSH, feeds the captured output back, and stops deterministically
//! after a bounded number of turns.
//!
//! # Architecture
//!
//! - **Core**: shared types, configuration, and error handling
//! - **LLM**: chat provider abstraction with an OpenAI-compatible client
//! - **Tools**: tool trait, registry, and the SSH exec tool
//! - **Agent**: command extractor, turn controller, session driver
//! - **CLI**: command-line interface and REPL

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{SessionDriver, SessionOutcome};
pub use cli::Repl;
pub use core::{Config, Result, SshPilotError};
