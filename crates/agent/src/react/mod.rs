//! ReAct pattern: Thought → Action → Observation loop.
//!
//! The agent reasons step by step, choosing tools to gather information,
//! then answers. How replies are framed and parsed is delegated to a
//! [`ReactProtocol`]:
//!
//! - [`StructuredProtocol`] (`function_calling`): native tool calls
//! - [`FreeTextProtocol`] (`text_parsing`): `Action:` / `Final Answer:` markers
//!
//! The loop terminates when the protocol reports an answer, or when
//! `max_steps` model calls have been made. Exhaustion is not an error: a
//! fixed fallback answer is returned and recorded in history.

pub mod protocol;
pub mod structured;
pub mod text;

pub use protocol::{protocol_for, LoopState, ReactProtocol, StepOutcome};
pub use structured::StructuredProtocol;
pub use text::FreeTextProtocol;

use std::sync::Arc;
use troupe_core::error::{CoordinationError, Error};
use troupe_core::history::{ConversationHistory, DEFAULT_MAX_TURNS};
use troupe_core::message::Message;
use troupe_core::provider::{Provider, ProviderRequest};
use troupe_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

/// Answer returned when the step ceiling is reached.
pub const FALLBACK_ANSWER: &str = "Sorry, I could not reach a clear conclusion after several attempts. \
Please simplify the question or provide more information.";

const DEFAULT_MAX_STEPS: u32 = 10;

/// A single reasoning agent.
pub struct ReactAgent {
    /// Model-call port.
    provider: Arc<dyn Provider>,
    /// Model name.
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    /// Tools this agent may call.
    tools: ToolRegistry,
    protocol: Box<dyn ReactProtocol>,
    /// Overrides the protocol's default system prompt.
    system_prompt: Option<String>,
    /// Ceiling on model calls per run.
    max_steps: u32,
    /// Past turns, owned by this agent only.
    history: ConversationHistory,
}

/// The result of a ReAct run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactResult {
    /// The final answer text.
    pub answer: String,
    /// Model calls made.
    pub steps: u32,
    /// Total tool executions.
    pub tool_calls_made: usize,
    /// True when the fallback answer was returned.
    pub exhausted: bool,
}

impl ReactAgent {
    /// Create an agent using the structured protocol and default limits.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, tools: ToolRegistry) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            tools,
            protocol: Box::new(StructuredProtocol),
            system_prompt: None,
            max_steps: DEFAULT_MAX_STEPS,
            history: ConversationHistory::new(DEFAULT_MAX_TURNS),
        }
    }

    /// Set max steps (model calls per run).
    pub fn with_max_steps(mut self, max: u32) -> Self {
        self.max_steps = max;
        self
    }

    pub fn with_protocol(mut self, protocol: Box<dyn ReactProtocol>) -> Self {
        self.protocol = protocol;
        self
    }

    /// Select the protocol by mode name (`function_calling` or `text_parsing`).
    pub fn with_mode_name(self, mode: &str) -> Result<Self, CoordinationError> {
        Ok(self.with_protocol(protocol_for(mode)?))
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Keep at most `turns` past user/assistant pairs. Clears history.
    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history = ConversationHistory::new(turns);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per model reply.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn mode(&self) -> &'static str {
        self.protocol.name()
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Clear conversation history. Configuration is untouched.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Execute the ReAct loop for one query.
    ///
    /// Only a failing model call surfaces as `Err`. Tool failures are fed
    /// back to the model as `error: ...` observations.
    pub async fn run(&mut self, query: &str) -> Result<ReactResult, Error> {
        let protocol = self.protocol.as_ref();
        let system = self
            .system_prompt
            .clone()
            .unwrap_or_else(|| protocol.system_prompt(&self.tools));

        let mut messages = vec![Message::system(system)];
        messages.extend(self.history.messages());
        messages.push(Message::user(protocol.initial_user_message(query)));

        let tool_defs = protocol.tool_definitions(&self.tools);
        let mut state = LoopState::new(messages, &self.tools);

        info!(
            model = %self.model,
            mode = protocol.name(),
            max_steps = self.max_steps,
            "ReAct loop starting"
        );

        for step in 1..=self.max_steps {
            state.step = step;
            debug!(step, "ReAct step");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: state.messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_defs.clone(),
            };
            let response = self.provider.complete(request).await?;

            if let StepOutcome::Terminate(answer) = protocol.step(response.message, &mut state).await {
                let tool_calls_made = state.tool_calls_made;
                self.history.add_turn(query, answer.as_str());
                info!(steps = step, tool_calls = tool_calls_made, "ReAct loop completed");
                return Ok(ReactResult {
                    answer,
                    steps: step,
                    tool_calls_made,
                    exhausted: false,
                });
            }
        }

        let tool_calls_made = state.tool_calls_made;
        warn!(max_steps = self.max_steps, "ReAct: step ceiling reached");
        self.history.add_turn(query, FALLBACK_ANSWER);

        Ok(ReactResult {
            answer: FALLBACK_ANSWER.to_string(),
            steps: self.max_steps,
            tool_calls_made,
            exhausted: true,
        })
    }
}

impl std::fmt::Debug for ReactAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactAgent")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("mode", &self.protocol.name())
            .field("max_steps", &self.max_steps)
            .field("tools", &self.tools)
            .field("history", &self.history.len())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use troupe_core::error::ProviderError;
    use troupe_core::history::is_paired;
    use troupe_core::message::Role;

    fn agent_with(provider: Arc<SequentialMockProvider>) -> ReactAgent {
        ReactAgent::new(provider, "mock-model", troupe_tools::default_registry())
    }

    #[tokio::test]
    async fn terminal_reply_needs_one_call() {
        let provider = Arc::new(SequentialMockProvider::single_text("Final answer"));
        let mut agent = agent_with(provider.clone());

        let result = agent.run("Hello").await.unwrap();
        assert_eq!(result.answer, "Final answer");
        assert_eq!(result.steps, 1);
        assert_eq!(result.tool_calls_made, 0);
        assert!(!result.exhausted);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn k_tool_steps_then_answer() {
        let counter = CountingTool::new("count");
        let mut tools = ToolRegistry::new();
        tools.register(counter.clone()).unwrap();

        let k = 3;
        let mut responses: Vec<_> = (0..k)
            .map(|i| {
                make_tool_call_response(
                    vec![make_tool_call("count", serde_json::json!({"label": format!("call-{i}")}))],
                    "Thinking...",
                )
            })
            .collect();
        responses.push(make_text_response("done"));

        let provider = Arc::new(SequentialMockProvider::new(responses));
        let mut agent = ReactAgent::new(provider.clone(), "mock-model", tools);

        let result = agent.run("count three times").await.unwrap();
        assert_eq!(result.answer, "done");
        assert_eq!(provider.call_count(), k + 1);
        assert_eq!(result.tool_calls_made, k);
        assert_eq!(counter.labels(), vec!["call-0", "call-1", "call-2"]);
    }

    #[tokio::test]
    async fn tool_schemas_sent_in_structured_mode() {
        let provider = Arc::new(SequentialMockProvider::tool_then_answer(
            vec![make_tool_call("calculator", serde_json::json!({"expression": "2 + 3"}))],
            "I need to calculate 2 + 3",
            "The result is 5",
        ));
        let mut agent = agent_with(provider.clone());

        let result = agent.run("What is 2+3?").await.unwrap();
        assert_eq!(result.answer, "The result is 5");

        let requests = provider.requests();
        assert_eq!(requests[0].tools.len(), 3);
        assert_eq!(requests[0].messages[0].role, Role::System);
        assert_eq!(requests[0].messages.last().unwrap().content, "What is 2+3?");

        // Second call sees the assistant call and the tool observation.
        let second = &requests[1].messages;
        let tool_msg = second.last().unwrap();
        assert_eq!(tool_msg.role, Role::Tool);
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_calculator"));
        assert_eq!(tool_msg.content, "5");
    }

    #[tokio::test]
    async fn step_ceiling_returns_fallback() {
        let responses: Vec<_> = (0..5)
            .map(|_| {
                make_tool_call_response(
                    vec![make_tool_call("calculator", serde_json::json!({"expression": "1+1"}))],
                    "Thinking...",
                )
            })
            .collect();

        let provider = Arc::new(SequentialMockProvider::new(responses));
        let mut agent = agent_with(provider.clone()).with_max_steps(3);

        let result = agent.run("Infinite loop").await.unwrap();
        assert_eq!(result.answer, FALLBACK_ANSWER);
        assert!(result.exhausted);
        assert_eq!(result.steps, 3);
        assert_eq!(provider.call_count(), 3);

        // The fallback is recorded like any other answer.
        let history = agent.history().messages();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn history_feeds_the_next_run_and_reset_clears_it() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_text_response("Nice to meet you, Ada."),
            make_text_response("Your name is Ada."),
            make_text_response("I don't know."),
        ]));
        let mut agent = agent_with(provider.clone()).with_max_steps(4);

        agent.run("My name is Ada.").await.unwrap();
        agent.run("What is my name?").await.unwrap();
        assert!(is_paired(&agent.history().messages()));
        assert_eq!(agent.history().turn_count(), 2);

        let second = &provider.requests()[1].messages;
        // system, prior user, prior assistant, new user
        assert_eq!(second.len(), 4);
        assert_eq!(second[1].content, "My name is Ada.");
        assert_eq!(second[2].content, "Nice to meet you, Ada.");

        agent.reset();
        assert!(agent.history().is_empty());
        assert_eq!(agent.max_steps(), 4);

        agent.run("What is my name?").await.unwrap();
        assert_eq!(provider.requests()[2].messages.len(), 2);
    }

    #[tokio::test]
    async fn text_mode_runs_actions_until_final_answer() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_text_response(
                "Thought: I should compute.\nAction: calculator\nAction Input: {\"expression\": \"6 * 7\"}",
            ),
            make_text_response("Thought: I now know.\nFinal Answer: 42"),
        ]));
        let mut agent = agent_with(provider.clone())
            .with_mode_name("text_parsing")
            .unwrap();

        let result = agent.run("What is 6 times 7?").await.unwrap();
        assert_eq!(result.answer, "42");
        assert_eq!(result.tool_calls_made, 1);

        let requests = provider.requests();
        assert!(requests[0].tools.is_empty());
        assert!(requests[0].messages[0].content.contains("- **calculator**"));
        assert_eq!(requests[0].messages[1].content, "Question: What is 6 times 7?\n");
        assert_eq!(
            requests[1].messages.last().unwrap().content,
            "Observation: 42\n\nContinue reasoning, or give the Final Answer."
        );

        let history = agent.history().messages();
        assert_eq!(history[0].content, "What is 6 times 7?");
        assert_eq!(history[1].content, "42");
    }

    #[tokio::test]
    async fn text_mode_unknown_tool_is_observed_not_raised() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_text_response("Action: teleport\nAction Input: {\"to\": \"Mars\"}"),
            make_text_response("Final Answer: cannot teleport"),
        ]));
        let mut agent = agent_with(provider.clone())
            .with_mode_name("text_parsing")
            .unwrap();

        let result = agent.run("Go to Mars").await.unwrap();
        assert_eq!(result.answer, "cannot teleport");
        let requests = provider.requests();
        let observation = &requests[1].messages.last().unwrap().content;
        assert!(observation.starts_with("Observation: error: tool 'teleport' not found"));
        assert!(observation.contains("calculator"));
    }

    #[tokio::test]
    async fn unknown_mode_name_fails() {
        let provider = Arc::new(SequentialMockProvider::single_text("x"));
        let err = agent_with(provider).with_mode_name("psychic").unwrap_err();
        assert!(matches!(err, CoordinationError::UnknownProtocol(_)));
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let provider = Arc::new(FailingProvider::new(ProviderError::Timeout("slow".into())));
        let mut agent = ReactAgent::new(provider, "mock-model", ToolRegistry::new());
        let err = agent.run("hi").await.unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::Timeout(_))));
        assert!(agent.history().is_empty());
    }

    #[tokio::test]
    async fn custom_system_prompt_and_generation_settings() {
        let provider = Arc::new(SequentialMockProvider::single_text("ok"));
        let mut agent = agent_with(provider.clone())
            .with_system_prompt("You are terse.")
            .with_temperature(0.1)
            .with_max_tokens(128)
            .with_history_turns(1);

        agent.run("a").await.unwrap();
        let request = &provider.requests()[0];
        assert_eq!(request.messages[0].content, "You are terse.");
        assert_eq!(request.temperature, 0.1);
        assert_eq!(request.max_tokens, Some(128));
        assert_eq!(agent.history().max_turns(), 1);
    }
}
