//! Session driver
//!
//! The outermost boundary of the agent: accepts one instruction, drives
//! the turn controller to completion, and converts every lower-layer
//! failure into a tagged outcome. No error crosses this boundary
//! unconverted, so the interactive loop always survives to take the
//! next instruction.

use std::sync::Arc;

use crate::agent::controller::TurnController;
use crate::core::{Config, ExecutionResult, SshPilotError};
use crate::llm::{ChatClient, ChatProvider};
use crate::tools::{SshExecTool, ToolRegistry, SSH_TOOL_NAME};

/// Reported result of one instruction
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    /// The model finished with plain text and no trailing tool call
    Answer(String),
    /// A remote command ran last; its captured output is the outcome
    Execution(ExecutionResult),
    /// Something below the boundary failed
    Failed {
        /// Human-readable failure message
        message: String,
        /// Full diagnostic detail
        detail: String,
    },
}

impl SessionOutcome {
    /// Render the outcome for the console
    pub fn render(&self) -> String {
        match self {
            SessionOutcome::Answer(text) => text.clone(),
            SessionOutcome::Execution(result) => result.summary(),
            SessionOutcome::Failed { message, detail } => {
                format!("Request failed: {}\n{}", message, detail)
            }
        }
    }

    /// Whether this outcome is a failure
    pub fn is_failed(&self) -> bool {
        matches!(self, SessionOutcome::Failed { .. })
    }
}

/// Drives one session per instruction
pub struct SessionDriver {
    config: Config,
    controller: TurnController,
}

impl SessionDriver {
    /// Create a driver wired to a live chat client and the SSH tool
    pub fn new(config: Config) -> Self {
        let provider: Arc<dyn ChatProvider> = Arc::new(ChatClient::from_config(&config));

        let mut registry = ToolRegistry::new();
        registry.register(Box::new(SshExecTool::new(config.ssh.clone())));

        Self::with_parts(config, provider, Arc::new(registry))
    }

    /// Create a driver from explicit parts (used by tests)
    pub fn with_parts(
        config: Config,
        provider: Arc<dyn ChatProvider>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        let controller = TurnController::new(provider, tools, SSH_TOOL_NAME, &config.agent);
        Self { config, controller }
    }

    /// Process one instruction and report its outcome
    ///
    /// This is the catch-all boundary: any `Err` from the controller,
    /// the provider, or a tool is folded into `SessionOutcome::Failed`.
    pub async fn run(&self, instruction: &str) -> SessionOutcome {
        match self.controller.run(instruction).await {
            Ok(outcome) => {
                if outcome.tool_was_last {
                    if let Some(result) = outcome.execution {
                        return SessionOutcome::Execution(result);
                    }
                }
                SessionOutcome::Answer(outcome.reply)
            }
            Err(e) => Self::failed(e),
        }
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn failed(error: SshPilotError) -> SessionOutcome {
        SessionOutcome::Failed {
            message: error.to_string(),
            detail: format!("{:?}", error),
        }
    }
}
