//! The agent loop and the session state it mutates.
//!
//! The loop alternates model calls and tool calls:
//!
//! 1. **Bootstrap** the context with the system prompt (first run only)
//! 2. **Ingest** the user input
//! 3. **Call the model** with the full context and every tool schema
//! 4. **If tool calls**: run them one by one, append each result, go to 3
//! 5. **Otherwise** append the answer and return it
//!
//! Every step is mirrored to the session's inspection hub.

pub mod context;
pub mod loop_runner;
pub mod session;
pub mod trace;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::ContextStore;
pub use loop_runner::{AgentLoop, NO_ANSWER};
pub use session::{AgentSession, SessionSnapshot};
