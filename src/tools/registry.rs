//! Tool registry - manages and dispatches tool calls
//!
//! The registry holds a closed set of `Tool` trait objects indexed by
//! name. The turn controller only ever talks to this interface, so new
//! tools extend the set without touching the loop.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::core::{Result, ToolCall, ToolDefinition, ToolResult};

/// An external capability the model may invoke
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name as advertised to the model
    fn name(&self) -> &str;

    /// Function-call schema advertised to the model
    fn definition(&self) -> ToolDefinition;

    /// Invoke the tool with decoded JSON arguments
    async fn invoke(&self, arguments: &serde_json::Value) -> Result<ToolResult>;
}

/// Registry of available tools
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get all tool definitions
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Check whether a tool with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Execute a tool call
    pub async fn execute(&self, tool_call: &ToolCall) -> Result<ToolResult> {
        match self.tools.get(&tool_call.name) {
            Some(tool) => tool.invoke(&tool_call.arguments).await,
            None => Ok(ToolResult::failure(
                &tool_call.name,
                format!("Unknown tool: {}", tool_call.name),
            )),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
