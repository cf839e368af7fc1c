//! Free-text protocol: prompt-driven tool use for models without native
//! tool calling.
//!
//! The model is asked to answer in this shape:
//!
//! ```text
//! Thought: ...
//! Action: <tool name>
//! Action Input: {"arg": "value"}
//! ```
//!
//! and to finish with `Final Answer: ...`. Markers are matched by first
//! occurrence. A reply that carries neither marker is taken as the answer.

use async_trait::async_trait;
use regex_lite::Regex;
use troupe_core::message::Message;
use troupe_core::provider::ToolDefinition;
use troupe_core::tool::ToolRegistry;
use tracing::{debug, info};

use super::protocol::{LoopState, ReactProtocol, StepOutcome};

const FINAL_ANSWER_PATTERN: &str = r"(?s)Final Answer:\s*(.+)";
const ACTION_PATTERN: &str = r"Action:\s*(\w+)";
const ACTION_INPUT_PATTERN: &str = r"(?s)Action Input:\s*(\{.*?\})";

pub struct FreeTextProtocol;

/// A parsed free-text reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    FinalAnswer(String),
    Action { name: String, input: String },
    /// Neither marker found.
    Unstructured,
}

/// Classify a reply. `Final Answer` wins over an action in the same reply.
pub fn parse_reply(text: &str) -> ParsedReply {
    if let Some(answer) = first_capture(FINAL_ANSWER_PATTERN, text) {
        return ParsedReply::FinalAnswer(answer.trim().to_string());
    }
    match first_capture(ACTION_PATTERN, text) {
        Some(name) => ParsedReply::Action {
            name,
            input: first_capture(ACTION_INPUT_PATTERN, text).unwrap_or_else(|| "{}".into()),
        },
        None => ParsedReply::Unstructured,
    }
}

fn first_capture(pattern: &str, text: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[async_trait]
impl ReactProtocol for FreeTextProtocol {
    fn name(&self) -> &'static str {
        "text_parsing"
    }

    fn system_prompt(&self, tools: &ToolRegistry) -> String {
        let catalogue = if tools.is_empty() {
            "(no tools available)".to_string()
        } else {
            tools.describe()
        };
        format!(
            "You are a capable assistant that reasons step by step and may use tools.

Available tools:
{catalogue}

Use exactly this format:

Thought: think about what to do next
Action: the tool name, one of the tools above
Action Input: the tool arguments as a JSON object, e.g. {{\"query\": \"...\"}}

After each action you will receive:

Observation: the tool result

Repeat Thought / Action / Action Input / Observation as many times as needed. \
When you know the answer, reply with:

Thought: I now know the final answer
Final Answer: the complete answer to the question

Emit only one Action per reply and never write an Observation yourself."
        )
    }

    fn initial_user_message(&self, query: &str) -> String {
        format!("Question: {query}\n")
    }

    fn tool_definitions(&self, _tools: &ToolRegistry) -> Vec<ToolDefinition> {
        Vec::new()
    }

    async fn step(&self, reply: Message, state: &mut LoopState<'_>) -> StepOutcome {
        let text = reply.content;
        debug!(step = state.step, output = %text, "Model output");

        let (name, input) = match parse_reply(&text) {
            ParsedReply::FinalAnswer(answer) => return StepOutcome::Terminate(answer),
            ParsedReply::Unstructured => return StepOutcome::Terminate(text),
            ParsedReply::Action { name, input } => (name, input),
        };

        info!(step = state.step, action = %name, input = %input, "Tool call");
        let observation = state.tools.execute_text(&name, &input).await;
        state.tool_calls_made += 1;
        debug!(step = state.step, tool = %name, observation = %observation, "Observation");

        state.messages.push(Message::assistant(text));
        state.messages.push(Message::user(format!(
            "Observation: {observation}\n\nContinue reasoning, or give the Final Answer."
        )));
        StepOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::CountingTool;

    #[test]
    fn final_answer_is_trimmed_and_spans_lines() {
        let reply = "Thought: done\nFinal Answer:  line one\nline two  \n";
        assert_eq!(
            parse_reply(reply),
            ParsedReply::FinalAnswer("line one\nline two".into())
        );
    }

    #[test]
    fn final_answer_wins_over_action() {
        let reply = "Action: search\nAction Input: {\"query\": \"x\"}\nFinal Answer: 7";
        assert_eq!(parse_reply(reply), ParsedReply::FinalAnswer("7".into()));
    }

    #[test]
    fn action_input_is_first_non_greedy_block() {
        let reply = "Thought: look it up\nAction: search\nAction Input: {\"query\": \"rust\"}\n\
                     Thought: and later {\"ignored\": true}";
        assert_eq!(
            parse_reply(reply),
            ParsedReply::Action {
                name: "search".into(),
                input: "{\"query\": \"rust\"}".into(),
            }
        );
    }

    #[test]
    fn action_without_input_defaults_to_empty_object() {
        assert_eq!(
            parse_reply("Action: clock"),
            ParsedReply::Action {
                name: "clock".into(),
                input: "{}".into(),
            }
        );
    }

    #[test]
    fn plain_text_is_unstructured() {
        assert_eq!(parse_reply("Paris is the capital."), ParsedReply::Unstructured);
    }

    #[test]
    fn system_prompt_lists_tools() {
        let mut tools = ToolRegistry::new();
        tools.register(CountingTool::new("count")).unwrap();
        let prompt = FreeTextProtocol.system_prompt(&tools);
        assert!(prompt.contains("- **count**"));
        assert!(prompt.contains("Final Answer:"));
        assert!(prompt.contains("{\"query\": \"...\"}"));
    }

    #[tokio::test]
    async fn unstructured_reply_is_the_answer() {
        let tools = ToolRegistry::new();
        let mut state = LoopState::new(vec![], &tools);
        let outcome = FreeTextProtocol
            .step(Message::assistant("Just an answer."), &mut state)
            .await;
        assert_eq!(outcome, StepOutcome::Terminate("Just an answer.".into()));
        assert!(state.messages.is_empty());
    }

    #[tokio::test]
    async fn action_appends_observation_turn() {
        let counter = CountingTool::new("count");
        let mut tools = ToolRegistry::new();
        tools.register(counter.clone()).unwrap();

        let mut state = LoopState::new(vec![], &tools);
        let reply = "Thought: count it\nAction: count\nAction Input: {\"label\": \"hello\"}";
        let outcome = FreeTextProtocol
            .step(Message::assistant(reply), &mut state)
            .await;

        assert_eq!(outcome, StepOutcome::Continue);
        assert_eq!(state.tool_calls_made, 1);
        assert_eq!(counter.labels(), vec!["hello"]);
        assert_eq!(state.messages[0].content, reply);
        assert_eq!(
            state.messages[1].content,
            "Observation: hello\n\nContinue reasoning, or give the Final Answer."
        );
    }
}
