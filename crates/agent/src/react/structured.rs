//! Structured-call protocol: native tool calling.
//!
//! Every model call carries the full tool schema set. A reply without
//! tool calls is the answer; otherwise each requested call is executed in
//! the order returned and its output appended as a tool message tagged
//! with the call id.

use async_trait::async_trait;
use troupe_core::message::Message;
use troupe_core::provider::ToolDefinition;
use troupe_core::tool::ToolRegistry;
use tracing::{debug, info};

use super::protocol::{LoopState, ReactProtocol, StepOutcome};

const SYSTEM_PROMPT: &str = "You are a capable assistant that solves problems step by step.

When a question needs facts, calculations, or lookups, call one of the available tools \
instead of guessing. Think about what you still need before each call, and use the tool \
results to decide the next step.

When you have enough information, reply to the user directly and concisely without \
calling any tool.";

pub struct StructuredProtocol;

#[async_trait]
impl ReactProtocol for StructuredProtocol {
    fn name(&self) -> &'static str {
        "function_calling"
    }

    fn system_prompt(&self, _tools: &ToolRegistry) -> String {
        SYSTEM_PROMPT.to_string()
    }

    fn tool_definitions(&self, tools: &ToolRegistry) -> Vec<ToolDefinition> {
        tools.definitions()
    }

    async fn step(&self, reply: Message, state: &mut LoopState<'_>) -> StepOutcome {
        if !reply.has_tool_calls() {
            let answer = reply.content.clone();
            state.messages.push(reply);
            return StepOutcome::Terminate(answer);
        }

        let calls = reply.tool_calls.clone();
        let thought = if reply.content.is_empty() {
            "(thinking...)".to_string()
        } else {
            reply.content.clone()
        };
        state.messages.push(reply);

        for call in &calls {
            info!(step = state.step, thought = %thought, action = %call.name, input = %call.arguments, "Tool call");

            let observation = state.tools.execute_text(&call.name, &call.arguments).await;
            state.tool_calls_made += 1;

            debug!(step = state.step, tool = %call.name, observation = %observation, "Observation");
            state.messages.push(Message::tool_result(&call.id, observation));
        }

        StepOutcome::Continue
    }
}
