//! Token-usage tracking with a per-model context-limit cache.

use loupe_core::provider::Provider;
use loupe_core::usage::TokenUsage;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::hub::InspectionHub;

/// Tracks the latest token usage and publishes every change.
///
/// Context limits are looked up through the provider's model catalog once per
/// model name and kept for the tracker's lifetime. A failed lookup is not
/// cached and degrades to an unknown limit.
pub struct TokenUsageTracker {
    provider: Arc<dyn Provider>,
    hub: Arc<InspectionHub>,
    limits: RwLock<HashMap<String, u64>>,
    last: RwLock<TokenUsage>,
}

impl TokenUsageTracker {
    pub fn new(provider: Arc<dyn Provider>, hub: Arc<InspectionHub>) -> Self {
        Self {
            provider,
            hub,
            limits: RwLock::new(HashMap::new()),
            last: RwLock::new(TokenUsage::default()),
        }
    }

    /// Record one model call's usage and publish the resulting snapshot.
    pub async fn record_usage(
        &self,
        prompt_tokens: u64,
        completion_tokens: u64,
        total_tokens: u64,
        model: &str,
    ) -> TokenUsage {
        let limit = self.context_limit(model).await;
        let usage = TokenUsage::new(prompt_tokens, completion_tokens, total_tokens, limit);
        debug!(
            model,
            prompt_tokens,
            completion_tokens,
            total_tokens,
            remaining = ?usage.remaining_tokens,
            "Token usage recorded"
        );
        self.store(usage);
        usage
    }

    /// Zero the counters, keep the (re-resolved) limit, mark remaining unknown.
    pub async fn reset(&self, model: &str) -> TokenUsage {
        let usage = TokenUsage::placeholder(self.context_limit(model).await);
        self.store(usage);
        usage
    }

    /// The last recorded or reset snapshot.
    pub fn current(&self) -> TokenUsage {
        *self.last.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached context limit for `model`, fetching it on first use.
    pub async fn context_limit(&self, model: &str) -> Option<u64> {
        if let Some(limit) = self.cached_limit(model) {
            return Some(limit);
        }

        match self.provider.context_limit(model).await {
            Ok(Some(limit)) => {
                self.limits
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(model.to_string(), limit);
                debug!(model, limit, "Context limit cached");
                Some(limit)
            }
            Ok(None) => {
                debug!(model, "Model not listed with a context limit");
                None
            }
            Err(e) => {
                debug!(model, error = %e, "Context limit lookup failed");
                None
            }
        }
    }

    fn cached_limit(&self, model: &str) -> Option<u64> {
        self.limits
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(model)
            .copied()
    }

    fn store(&self, usage: TokenUsage) {
        *self.last.write().unwrap_or_else(PoisonError::into_inner) = usage;
        self.hub.publish_usage(&usage);
    }
}
