//! Turn controller
//!
//! Drives the model/tool cycle as an explicit three-state machine:
//! `AwaitingModel` asks the model, `AwaitingTool` runs at most one tool
//! invocation for the latest reply, `Done` is terminal. The transcript
//! length guard is checked before every step and is the sole
//! termination guarantee when the model keeps requesting tool calls.

use std::sync::Arc;

use crate::agent::conversation::Conversation;
use crate::agent::extractor::{extract, Extraction};
use crate::core::{AgentConfig, ExecutionResult, Result, ToolCall};
use crate::llm::{ChatProvider, GenerateOptions, LlmResponse};
use crate::tools::ToolRegistry;

/// Hard cap on transcript length before the loop is forced to stop
pub const MAX_TURNS: usize = 10;

/// Fixed instruction sent once, ahead of the first model call
pub const SYSTEM_PROMPT: &str = "You are an SSH remote executor. \
Respond with exactly one JSON object of the form {\"command\": \"<linux command>\"} \
and nothing else. If several commands could work, pick one and return it directly, \
without any explanation. When the task is complete, reply with a short plain-text \
summary instead of JSON.";

/// State of the turn cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    AwaitingModel,
    AwaitingTool,
    Done,
}

/// What a finished cycle produced
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Final model text (the last assistant message)
    pub reply: String,
    /// Result of the last command that ran, if any
    pub execution: Option<ExecutionResult>,
    /// Whether a tool invocation was the final event of the cycle
    pub tool_was_last: bool,
    /// Number of model invocations
    pub turns: usize,
    /// Final transcript length
    pub transcript_len: usize,
}

/// Drives the request/response cycle between model and tools
pub struct TurnController {
    provider: Arc<dyn ChatProvider>,
    tools: Arc<ToolRegistry>,
    /// Tool that text-extracted commands are routed to
    command_tool: String,
    max_turns: usize,
    debug: bool,
}

impl TurnController {
    /// Create a controller over a provider and a tool set
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        tools: Arc<ToolRegistry>,
        command_tool: impl Into<String>,
        agent: &AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            command_tool: command_tool.into(),
            max_turns: agent.max_turns,
            debug: agent.debug,
        }
    }

    /// Run one instruction to completion
    ///
    /// A fresh transcript is seeded for every call; nothing is kept
    /// across instructions. Errors from the model call or a tool
    /// invocation propagate to the caller unchanged.
    pub async fn run(&self, instruction: &str) -> Result<TurnOutcome> {
        let mut transcript = Conversation::new();
        transcript.set_system_prompt(SYSTEM_PROMPT);
        transcript.add_user(instruction);

        let definitions = self.tools.definitions();
        let options = Some(GenerateOptions {
            temperature: Some(0.3),
            ..Default::default()
        });

        let mut state = TurnState::AwaitingModel;
        let mut pending_call: Option<ToolCall> = None;
        let mut execution: Option<ExecutionResult> = None;
        let mut tool_was_last = false;
        let mut turns = 0usize;

        while state != TurnState::Done {
            // Continuation guard, evaluated before every model or tool
            // step. This is the only unconditional stop.
            if transcript.len() > self.max_turns {
                if self.debug {
                    eprintln!(
                        "DEBUG: turn cap hit ({} messages), forcing stop",
                        transcript.len()
                    );
                }
                break;
            }

            match state {
                TurnState::AwaitingModel => {
                    let response = self
                        .provider
                        .chat_with_tools(&transcript.get_messages(), &definitions, options.clone())
                        .await?;
                    turns += 1;

                    // The resolved call stays on the assistant message;
                    // the answering tool message references it by id,
                    // which the chat API requires on replay.
                    let call = self.resolve_tool_call(&response, turns);
                    match &call {
                        Some(c) => {
                            transcript.add_assistant_with_calls(&response.content, vec![c.clone()])
                        }
                        None => transcript.add_assistant(&response.content),
                    }
                    tool_was_last = false;
                    pending_call = call;
                    state = TurnState::AwaitingTool;
                }
                TurnState::AwaitingTool => {
                    let call = match pending_call.take() {
                        Some(call) => call,
                        // ParseFailure or no tool-invocation marker: done
                        None => {
                            state = TurnState::Done;
                            continue;
                        }
                    };

                    if self.debug {
                        eprintln!("DEBUG: invoking {} with {}", call.name, call.arguments);
                    }

                    let result = self.tools.execute(&call).await?;
                    if let Some(exec) = result.execution_result() {
                        execution = Some(exec);
                    }
                    transcript.add_tool(&result.output, &call.id);
                    tool_was_last = true;
                    state = TurnState::AwaitingModel;
                }
                TurnState::Done => unreachable!(),
            }
        }

        let reply = transcript
            .last_assistant_message()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        Ok(TurnOutcome {
            reply,
            execution,
            tool_was_last,
            turns,
            transcript_len: transcript.len(),
        })
    }

    /// Decide whether the latest reply requests a tool invocation
    ///
    /// Structured tool calls take priority over text extraction; both
    /// paths validate a non-empty command. Text-extracted commands get
    /// a synthesized call id unique within the transcript. `None` means
    /// the cycle ends.
    fn resolve_tool_call(&self, response: &LlmResponse, turn: usize) -> Option<ToolCall> {
        if let Some(call) = response.tool_calls.first() {
            let command = call.get_string("command").unwrap_or_default();
            if command.trim().is_empty() {
                return None;
            }
            return Some(call.clone());
        }

        match extract(&response.content) {
            Extraction::Command(command) => Some(ToolCall::new(
                format!("call_{}", turn),
                self.command_tool.clone(),
                serde_json::json!({ "command": command }),
            )),
            Extraction::Invalid | Extraction::NoToolCall => None,
        }
    }
}
