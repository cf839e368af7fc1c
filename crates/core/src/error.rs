//! Error types for the Troupe domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Only configuration misuse is meant to escape to a caller as an `Err`.
//! Recoverable execution failures (missing tool, bad arguments, unknown
//! agent) are rendered as text starting with [`ERROR_PREFIX`] and fed back
//! into whatever loop produced them.

use thiserror::Error;

/// Reserved prefix of every textual error observation or dispatch result.
pub const ERROR_PREFIX: &str = "error: ";

/// The top-level error type for all Troupe operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Coordination errors ---
    #[error("Coordination error: {0}")]
    Coordination(#[from] CoordinationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool '{0}' not found")]
    NotFound(String),

    #[error("tool '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("tool '{tool_name}' failed: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Clone, Error)]
pub enum CoordinationError {
    #[error("unsupported protocol '{0}', expected 'function_calling' or 'text_parsing'")]
    UnknownProtocol(String),

    #[error("role '{name}' does not exist. Available roles: {available:?}")]
    UnknownRole { name: String, available: Vec<String> },

    #[error("debate has no participants")]
    MissingDebaters,

    #[error("debate has no judge")]
    MissingJudge,

    #[error("pipeline has no steps")]
    EmptyPipeline,
}
