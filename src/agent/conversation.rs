//! Conversation transcript management
//!
//! One transcript per session-driver invocation; nothing survives past
//! it. The system prompt is stored separately so it never counts toward
//! the turn cap.

use std::collections::VecDeque;

use crate::core::{Message, ToolCall};

/// Ordered transcript of a single agent session
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    /// Message history (user, assistant, tool)
    messages: VecDeque<Message>,
    /// System prompt (always first when rendered)
    system_prompt: Option<String>,
}

impl Conversation {
    /// Create a new empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the system prompt
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = Some(prompt.into());
    }

    /// Add a user message
    pub fn add_user(&mut self, content: impl Into<String>) {
        self.messages.push_back(Message::user(content));
    }

    /// Add an assistant message
    pub fn add_assistant(&mut self, content: impl Into<String>) {
        self.messages.push_back(Message::assistant(content));
    }

    /// Add an assistant message together with the tool calls it made
    pub fn add_assistant_with_calls(&mut self, content: impl Into<String>, calls: Vec<ToolCall>) {
        self.messages.push_back(Message::assistant_with_calls(content, calls));
    }

    /// Add a tool-result message answering the given call id
    pub fn add_tool(&mut self, content: impl Into<String>, call_id: impl Into<String>) {
        self.messages.push_back(Message::tool(content, call_id));
    }

    /// Get all messages including the system prompt
    pub fn get_messages(&self) -> Vec<Message> {
        let mut result = Vec::new();

        if let Some(ref prompt) = self.system_prompt {
            result.push(Message::system(prompt.clone()));
        }

        result.extend(self.messages.iter().cloned());
        result
    }

    /// Get the last assistant message
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == "assistant")
    }

    /// Transcript length, excluding the system prompt
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
