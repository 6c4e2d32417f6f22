//! OpenAI-compatible chat client
//!
//! Async HTTP client for any chat-completions endpoint speaking the
//! OpenAI dialect (ZhipuAI GLM is the default target). Tool calls come
//! back with their arguments as a JSON-encoded string, which is decoded
//! here so the rest of the crate only sees structured values.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Config, LlmConfig, Message, Result, SshPilotError, ToolCall, ToolDefinition};
use crate::llm::traits::{ChatProvider, GenerateOptions, LlmResponse, TokenUsage};

/// Chat-completions API client
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    debug: bool,
}

/// Chat request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Wire message format
#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

/// Wire tool call format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    call_type: String,
    function: WireFunction,
}

/// Function inside a wire tool call; arguments arrive as a JSON string
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

/// Chat response body
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl ChatClient {
    /// Create a new client from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.llm, config.agent.debug)
    }

    /// Create a new client from the LLM section
    pub fn new(llm: &LlmConfig, debug: bool) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            api_key: llm.api_key.clone(),
            model: llm.model.clone(),
            temperature: llm.temperature,
            debug,
        }
    }

    /// Convert internal Message to wire format
    ///
    /// Assistant tool calls and the tool message's `tool_call_id` must
    /// both survive into the wire form; the API rejects a tool message
    /// whose id does not answer a preceding assistant call.
    fn to_wire_message(msg: &Message) -> WireMessage {
        WireMessage {
            role: msg.role.clone(),
            content: msg.content.clone(),
            tool_calls: msg.tool_calls.as_ref().map(|calls| {
                calls
                    .iter()
                    .map(|tc| WireToolCall {
                        id: tc.id.clone(),
                        call_type: "function".to_string(),
                        function: WireFunction {
                            name: tc.name.clone(),
                            arguments: tc.arguments.to_string(),
                        },
                    })
                    .collect()
            }),
            tool_call_id: msg.tool_call_id.clone(),
        }
    }

    /// Convert a wire response to LlmResponse
    fn to_llm_response(response: ChatResponse) -> Result<LlmResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SshPilotError::llm("Chat API returned no choices"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, tc)| {
                let arguments = serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::Null);
                // Servers omitting the id still need one to echo back
                let id = if tc.id.is_empty() {
                    format!("call_{}", i)
                } else {
                    tc.id
                };
                ToolCall::new(id, tc.function.name, arguments)
            })
            .collect();

        let usage = response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            usage,
            model: response.model,
        })
    }

    /// Debug print if enabled
    fn debug_print(&self, label: &str, content: &str) {
        if self.debug {
            if content.len() > 500 {
                let mut end = 500;
                while !content.is_char_boundary(end) {
                    end -= 1;
                }
                eprintln!("DEBUG {}: {}...", label, &content[..end]);
            } else {
                eprintln!("DEBUG {}: {}", label, content);
            }
        }
    }

    async fn send(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        options: Option<GenerateOptions>,
    ) -> Result<LlmResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SshPilotError::llm("No API key configured (LLM_API_KEY)"))?;

        let wire_messages: Vec<WireMessage> = messages.iter().map(Self::to_wire_message).collect();

        let request = ChatRequest {
            model: &self.model,
            messages: wire_messages,
            tools,
            temperature: options
                .as_ref()
                .and_then(|o| o.temperature)
                .or(Some(self.temperature)),
            max_tokens: options.as_ref().and_then(|o| o.max_tokens),
        };

        let request_json = serde_json::to_string(&request)?;
        self.debug_print("Request", &request_json);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    SshPilotError::llm(format!(
                        "Cannot reach chat API at {}: {}",
                        self.base_url, e
                    ))
                } else {
                    SshPilotError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SshPilotError::llm(format!(
                "Chat API error ({}): {}",
                status, error_text
            )));
        }

        let response_text = response.text().await?;
        self.debug_print("Response", &response_text);

        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| SshPilotError::llm(format!("Failed to parse response: {}", e)))?;

        Self::to_llm_response(chat_response)
    }
}

#[async_trait]
impl ChatProvider for ChatClient {
    async fn chat(
        &self,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<LlmResponse> {
        self.send(messages, None, options).await
    }

    async fn chat_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LlmResponse> {
        self.send(messages, Some(tools), options).await
    }

    fn name(&self) -> &str {
        "openai-compat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let llm = LlmConfig {
            base_url: "https://api.example.com/v1/".into(),
            api_key: Some("key".into()),
            model: "glm-4-plus".into(),
            timeout_secs: 30,
            temperature: 0.3,
        };
        let client = ChatClient::new(&llm, false);
        assert_eq!(client.base_url, "https://api.example.com/v1");
        assert_eq!(client.model, "glm-4-plus");
    }

    #[test]
    fn test_message_conversion() {
        let msg = Message::user("Hello");
        let wire = ChatClient::to_wire_message(&msg);
        assert_eq!(wire.role, "user");
        assert_eq!(wire.content, "Hello");
    }

    #[test]
    fn test_tool_call_arguments_decoded_from_string() {
        let response = ChatResponse {
            choices: vec![Choice {
                message: ChoiceMessage {
                    content: None,
                    tool_calls: Some(vec![WireToolCall {
                        id: "call_abc123".into(),
                        call_type: "function".into(),
                        function: WireFunction {
                            name: "ssh_exec".into(),
                            arguments: r#"{"command": "uptime"}"#.into(),
                        },
                    }]),
                },
            }],
            model: "glm-4-plus".into(),
            usage: None,
        };
        let llm = ChatClient::to_llm_response(response).unwrap();
        assert!(llm.has_tool_calls());
        assert_eq!(llm.tool_calls[0].id, "call_abc123");
        assert_eq!(
            llm.tool_calls[0].get_string("command").as_deref(),
            Some("uptime")
        );
    }

    #[test]
    fn test_missing_wire_id_is_synthesized() {
        let response = ChatResponse {
            choices: vec![Choice {
                message: ChoiceMessage {
                    content: None,
                    tool_calls: Some(vec![WireToolCall {
                        id: String::new(),
                        call_type: String::new(),
                        function: WireFunction {
                            name: "ssh_exec".into(),
                            arguments: r#"{"command": "uptime"}"#.into(),
                        },
                    }]),
                },
            }],
            model: "glm-4-plus".into(),
            usage: None,
        };
        let llm = ChatClient::to_llm_response(response).unwrap();
        assert!(!llm.tool_calls[0].id.is_empty());
    }

    #[test]
    fn test_tool_turn_replays_call_id_on_the_wire() {
        let call = ToolCall::new(
            "call_abc123",
            "ssh_exec",
            serde_json::json!({"command": "uptime"}),
        );
        let assistant = ChatClient::to_wire_message(&Message::assistant_with_calls("", vec![call]));
        let calls = assistant.tool_calls.unwrap();
        assert_eq!(calls[0].id, "call_abc123");
        assert_eq!(calls[0].call_type, "function");
        assert!(assistant.tool_call_id.is_none());

        let tool = ChatClient::to_wire_message(&Message::tool("exit_code: 0\n", "call_abc123"));
        assert_eq!(tool.role, "tool");
        assert_eq!(tool.tool_call_id.as_deref(), Some("call_abc123"));

        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["tool_call_id"], "call_abc123");
    }

    #[test]
    fn test_empty_choices_is_error() {
        let response = ChatResponse {
            choices: vec![],
            model: "glm-4-plus".into(),
            usage: None,
        };
        assert!(ChatClient::to_llm_response(response).is_err());
    }
}
