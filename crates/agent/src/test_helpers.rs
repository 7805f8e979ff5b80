//! Shared test helpers for loop and session tests.

use async_trait::async_trait;
use loupe_core::error::{ProviderError, ToolError};
use loupe_core::message::{Message, ToolCall};
use loupe_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use loupe_core::tool::Tool;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted replies.
///
/// Each call to `complete` pops the next reply and records the request.
/// Running out of replies is reported as an invalid response.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
    context_limit: Option<u64>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            context_limit: None,
        }
    }

    pub fn with_context_limit(mut self, limit: Option<u64>) -> Self {
        self.context_limit = limit;
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::InvalidResponse("script exhausted".into())))
    }

    async fn context_limit(&self, _model: &str) -> Result<Option<u64>, ProviderError> {
        Ok(self.context_limit)
    }
}

/// A final text reply.
pub fn text_reply(text: &str) -> Result<ProviderResponse, ProviderError> {
    reply(Message::assistant(text))
}

/// A reply requesting `calls`, with no text.
pub fn tool_reply(calls: Vec<ToolCall>) -> Result<ProviderResponse, ProviderError> {
    let mut message = Message::assistant("");
    message.content = None;
    message.tool_calls = calls;
    reply(message)
}

pub fn reply(message: Message) -> Result<ProviderResponse, ProviderError> {
    Ok(ProviderResponse {
        message,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    })
}

/// Returns its arguments unchanged.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the arguments back"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        Ok(arguments)
    }
}

/// Always fails.
pub struct BrokenTool;

#[async_trait]
impl Tool for BrokenTool {
    fn name(&self) -> &str {
        "broken"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "broken".into(),
            reason: "disk on fire".into(),
        })
    }
}
