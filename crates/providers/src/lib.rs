//! Model endpoint providers for Loupe.
//!
//! All providers implement the `loupe_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
