//! The conversation context shared by every run of a session.

use loupe_core::message::Message;
use loupe_core::usage::TokenUsage;
use loupe_inspection::{InspectionHub, TokenUsageTracker};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Ordered conversation history.
///
/// Append-only except for [`ContextStore::clear`]. Every mutation publishes
/// the full history to the context topic.
pub struct ContextStore {
    messages: RwLock<Vec<Message>>,
    hub: Arc<InspectionHub>,
    usage: Arc<TokenUsageTracker>,
}

impl ContextStore {
    pub fn new(hub: Arc<InspectionHub>, usage: Arc<TokenUsageTracker>) -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
            hub,
            usage,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Message>> {
        self.messages.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Message>> {
        self.messages.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, message: Message) {
        let mut messages = self.write();
        debug!(role = %message.role, position = messages.len(), "Context append");
        messages.push(message);
        self.hub.publish_context(&messages);
    }

    /// A copy of the history; later mutations do not affect it.
    pub fn snapshot(&self) -> Vec<Message> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Empty the history and reset token usage for `model`.
    pub async fn clear(&self, model: &str) -> TokenUsage {
        {
            let mut messages = self.write();
            messages.clear();
            self.hub.publish_context(&messages);
        }
        self.hub.publish_log("Context cleared");
        self.usage.reset(model).await
    }
}
