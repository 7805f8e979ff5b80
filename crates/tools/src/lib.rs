//! Built-in tool implementations for Loupe.
//!
//! Both tools are deterministic stubs: they derive plausible data from a hash
//! of their input so the agent loop can be exercised end to end without
//! network access.

pub mod movie;
pub mod weather;

use loupe_core::tool::ToolRegistry;

pub use movie::MovieLookupTool;
pub use weather::WeatherLookupTool;

/// Create a tool registry with every built-in tool.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WeatherLookupTool));
    registry.register(Box::new(MovieLookupTool));
    registry
}

/// Deterministic string hash used to vary stub output per input.
pub(crate) fn stable_hash(input: &str) -> u32 {
    input
        .to_lowercase()
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
}
