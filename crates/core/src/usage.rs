//! Token usage snapshot as shown to observers.

use serde::{Deserialize, Serialize};

/// The most recent accounting of consumed and remaining context budget.
///
/// `remaining_tokens` is `context_limit - total_tokens` and goes negative once
/// the conversation outgrows the window. It is `None` when the limit is
/// unknown and after a reset; observers render that as "unknown", which is
/// different from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub context_limit: Option<u64>,
    pub remaining_tokens: Option<i64>,
}

impl TokenUsage {
    /// Build a snapshot, deriving `remaining_tokens` from the limit.
    pub fn new(
        prompt_tokens: u64,
        completion_tokens: u64,
        total_tokens: u64,
        context_limit: Option<u64>,
    ) -> Self {
        let remaining_tokens =
            context_limit.map(|limit| signed(limit).saturating_sub(signed(total_tokens)));
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
            context_limit,
            remaining_tokens,
        }
    }

    /// Zeroed counters with remaining unknown.
    pub fn placeholder(context_limit: Option<u64>) -> Self {
        Self {
            context_limit,
            ..Self::default()
        }
    }
}

fn signed(tokens: u64) -> i64 {
    i64::try_from(tokens).unwrap_or(i64::MAX)
}
