//! The loop-protocol seam of the ReAct driver.
//!
//! A protocol decides how the conversation with the model is framed and
//! how each reply is interpreted. The driver in [`super::ReactAgent`] only
//! issues model calls and asks the protocol what to do with each reply.

use async_trait::async_trait;
use troupe_core::error::CoordinationError;
use troupe_core::message::Message;
use troupe_core::provider::ToolDefinition;
use troupe_core::tool::ToolRegistry;

use super::structured::StructuredProtocol;
use super::text::FreeTextProtocol;

/// What the driver should do after one model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Observations were appended; issue another model call.
    Continue,
    /// The run is over with this answer.
    Terminate(String),
}

/// Mutable state of one run, shared between the driver and the protocol.
pub struct LoopState<'a> {
    /// Message list sent with every model call.
    pub messages: Vec<Message>,
    /// Tools reachable by this run.
    pub tools: &'a ToolRegistry,
    /// Tool executions performed so far.
    pub tool_calls_made: usize,
    /// 1-based index of the model call being interpreted.
    pub step: u32,
}

impl<'a> LoopState<'a> {
    pub fn new(messages: Vec<Message>, tools: &'a ToolRegistry) -> Self {
        Self {
            messages,
            tools,
            tool_calls_made: 0,
            step: 0,
        }
    }
}

#[async_trait]
pub trait ReactProtocol: Send + Sync {
    /// Mode name used in configuration (e.g. "function_calling").
    fn name(&self) -> &'static str;

    /// Default system prompt for an agent holding `tools`.
    fn system_prompt(&self, tools: &ToolRegistry) -> String;

    /// The user message that opens a run.
    fn initial_user_message(&self, query: &str) -> String {
        query.to_string()
    }

    /// Tool schemas sent with each model call.
    fn tool_definitions(&self, tools: &ToolRegistry) -> Vec<ToolDefinition>;

    /// Interpret one model reply, executing any requested tools.
    async fn step(&self, reply: Message, state: &mut LoopState<'_>) -> StepOutcome;
}

/// Resolve a protocol from its configuration name.
pub fn protocol_for(name: &str) -> Result<Box<dyn ReactProtocol>, CoordinationError> {
    match name {
        "function_calling" => Ok(Box::new(StructuredProtocol)),
        "text_parsing" => Ok(Box::new(FreeTextProtocol)),
        other => Err(CoordinationError::UnknownProtocol(other.to_string())),
    }
}
