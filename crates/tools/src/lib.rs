//! Built-in tool implementations for Troupe.
//!
//! Tools give agents something to act with: do math, search, and check
//! the weather. Search and weather are offline mocks.

pub mod calculator;
pub mod search;
pub mod weather;

use troupe_core::tool::ToolRegistry;

pub use calculator::CalculatorTool;
pub use search::SearchTool;
pub use weather::WeatherTool;

/// Create a registry holding every built-in tool.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    // Built-in names are distinct, so registration cannot collide.
    let _ = registry.register(CalculatorTool);
    let _ = registry.register(SearchTool);
    let _ = registry.register(WeatherTool);
    registry
}
