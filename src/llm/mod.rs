//! LLM module - chat model integration
//!
//! Provides the provider abstraction and an OpenAI-compatible client.

pub mod openai;
pub mod traits;

pub use openai::ChatClient;
pub use traits::{ChatProvider, GenerateOptions, LlmResponse, TokenUsage};
