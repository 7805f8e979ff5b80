//! Per-session state: context, token usage, tools and the inspection hub.

use loupe_core::message::Message;
use loupe_core::provider::Provider;
use loupe_core::tool::ToolRegistry;
use loupe_core::usage::TokenUsage;
use loupe_inspection::{InspectionHub, TokenUsageTracker};
use serde::Serialize;
use std::sync::Arc;

use crate::context::ContextStore;

/// Everything one agent conversation owns.
///
/// Sessions are independent; nothing here is process-global.
pub struct AgentSession {
    hub: Arc<InspectionHub>,
    usage: Arc<TokenUsageTracker>,
    context: ContextStore,
    tools: Arc<ToolRegistry>,
}

/// Point-in-time export of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub context: Vec<Message>,
    pub tools: Vec<serde_json::Value>,
    pub token_usage: TokenUsage,
}

impl AgentSession {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        hub: Arc<InspectionHub>,
    ) -> Self {
        let usage = Arc::new(TokenUsageTracker::new(provider, hub.clone()));
        let context = ContextStore::new(hub.clone(), usage.clone());
        Self {
            hub,
            usage,
            context,
            tools,
        }
    }

    pub fn hub(&self) -> &Arc<InspectionHub> {
        &self.hub
    }

    pub fn usage(&self) -> &TokenUsageTracker {
        &self.usage
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Tool schemas in the chat-completions `{"type":"function", ...}` shape.
    pub fn tool_schemas(&self) -> Vec<serde_json::Value> {
        self.tools
            .definitions()
            .into_iter()
            .map(|def| serde_json::json!({ "type": "function", "function": def }))
            .collect()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            context: self.context.snapshot(),
            tools: self.tool_schemas(),
            token_usage: self.usage.current(),
        }
    }
}
