//! Provider trait: the abstraction over the remote model endpoint.
//!
//! A Provider knows how to send a conversation to a chat-completions style
//! endpoint and get one assistant message back, and how to look up a model's
//! context window in the endpoint's model catalog.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::Message;

/// How the model may choose tools. The loop always lets the model decide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    #[default]
    Auto,
}

/// One completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "z-ai/glm-4.5-air:free")
    pub model: String,

    /// The full conversation, system prompt first
    pub messages: Vec<Message>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    #[serde(default)]
    pub tool_choice: ToolChoice,
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The assistant message
    pub message: Message,

    /// Token accounting, when the endpoint reports it
    pub usage: Option<Usage>,
}

/// Token usage as reported by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The agent loop calls `complete()` once per iteration and never retries;
/// retry policy belongs to whoever wraps the loop.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openrouter").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;

    /// Look up the context window of `model`.
    ///
    /// `Ok(None)` means the catalog does not list the model or carries no
    /// length for it. The default implementation knows no limits.
    async fn context_limit(&self, _model: &str) -> std::result::Result<Option<u64>, ProviderError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_choice_defaults_to_auto() {
        let json = serde_json::to_string(&ToolChoice::default()).unwrap();
        assert_eq!(json, r#""auto""#);
    }

    #[test]
    fn tool_definition_serialization() {
        let tool = ToolDefinition {
            name: "getWeather".into(),
            description: "Get weather conditions for a given city name.".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string" }
                },
                "required": ["location"]
            }),
        };
        let json = serde_json::to_string(&tool).unwrap();
        assert!(json.contains("getWeather"));
        assert!(json.contains("location"));
    }
}
