//! Live inspection of a running agent.
//!
//! Provides a best-effort broadcast hub with one observer slot per topic
//! (trace log, context snapshot, token usage) and the token-usage tracker
//! that resolves and caches model context limits.

pub mod hub;
pub mod usage;

pub use hub::{InspectionHub, Observer, ObserverId, Topic};
pub use usage::TokenUsageTracker;

/// Default capacity of each observer queue, in frames.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
