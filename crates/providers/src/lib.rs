//! Model-call provider implementations for Troupe.
//!
//! One implementation covers every OpenAI-compatible `/chat/completions`
//! endpoint: OpenAI itself, DeepSeek, OpenRouter, Ollama, vLLM and friends.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
