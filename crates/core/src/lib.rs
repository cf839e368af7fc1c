//! # Troupe Core
//!
//! Messages, the model-call port ([`Provider`]), tools and their registry,
//! conversation history, and the error taxonomy shared by every Troupe
//! crate.
//!
//! The two external collaborators, a model endpoint and a tool, are traits.
//! `troupe-providers` and `troupe-tools` implement them; tests script them.

pub mod error;
pub mod history;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{CoordinationError, Error, ProviderError, Result, ToolError, ERROR_PREFIX};
pub use history::ConversationHistory;
pub use message::{Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
