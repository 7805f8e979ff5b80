//! # Loupe Core
//!
//! Domain types, traits, and error definitions for the Loupe agent runtime.
//! This crate has **no framework dependencies**. It defines the domain model
//! that the other crates implement against:
//!
//! - [`Provider`]: the remote model endpoint
//! - [`Tool`] / [`ToolRegistry`]: what the model may invoke
//! - [`Message`]: one turn of the conversation
//! - [`InspectionEvent`] / [`TokenUsage`]: what observers see

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod tool;
pub mod usage;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError};
pub use event::{InspectionEvent, TraceChild, TraceLabel};
pub use message::{Message, Role, ToolCall};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolChoice, ToolDefinition, Usage};
pub use tool::{Tool, ToolRegistry};
pub use usage::TokenUsage;
