//! Command extractor
//!
//! Pulls a single `{"command": "..."}` object out of raw model text.
//! The scan is substring-based (first `{` to last `}`), so replies
//! wrapped in prose still decode; embedded newlines are stripped before
//! decoding. This function is total: malformed input yields the
//! `invalid_format` sentinel, never an error.

use serde::Deserialize;

/// Sentinel command value carried by a parse failure
pub const INVALID_COMMAND: &str = "invalid_format";

/// Outcome of scanning one model response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// A well-formed, non-empty command
    Command(String),
    /// A `{...}` substring was present but did not decode to a
    /// non-empty `command` field; callers must not execute this
    Invalid,
    /// No tool-invocation marker in the text at all
    NoToolCall,
}

impl Extraction {
    /// The command string, with the sentinel standing in for failures
    pub fn command(&self) -> &str {
        match self {
            Extraction::Command(cmd) => cmd,
            _ => INVALID_COMMAND,
        }
    }
}

#[derive(Deserialize)]
struct CommandEnvelope {
    #[serde(default)]
    command: String,
}

/// Extract a command from raw model output
pub fn extract(model_text: &str) -> Extraction {
    let start = match model_text.find('{') {
        Some(i) => i,
        None => return Extraction::NoToolCall,
    };
    let end = match model_text.rfind('}') {
        Some(i) if i > start => i,
        _ => return Extraction::Invalid,
    };

    let candidate: String = model_text[start..=end]
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect();

    match serde_json::from_str::<CommandEnvelope>(&candidate) {
        Ok(envelope) if !envelope.command.trim().is_empty() => {
            Extraction::Command(envelope.command)
        }
        _ => Extraction::Invalid,
    }
}
