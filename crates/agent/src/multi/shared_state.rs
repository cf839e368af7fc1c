//! The blackboard shared by all agents of one coordinator.

use serde::{Deserialize, Serialize};

use super::message::{AgentMessage, MessageKind, BROADCAST};

const DEFAULT_MAX_STEPS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Planning,
    Executing,
    Reviewing,
    Done,
    Failed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Planning => "planning",
            Self::Executing => "executing",
            Self::Reviewing => "reviewing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task, plan, results, and message log of one coordination run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedState {
    pub task: String,
    /// Human-readable plan, one entry per step.
    pub plan: Vec<String>,
    /// Agent name → latest result, ordered by first completion.
    results: Vec<(String, String)>,
    messages: Vec<AgentMessage>,
    pub status: Status,
    /// 1-based index of the step in progress.
    pub current_step: usize,
    pub max_steps: usize,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            task: String::new(),
            plan: Vec::new(),
            results: Vec::new(),
            messages: Vec::new(),
            status: Status::Idle,
            current_step: 0,
            max_steps: DEFAULT_MAX_STEPS,
            metadata: serde_json::Map::new(),
        }
    }
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, message: AgentMessage) {
        self.messages.push(message);
    }

    /// Record an agent's result and log it as a RESULT message to "system".
    ///
    /// A repeat result from the same agent replaces the earlier one but
    /// keeps its position.
    pub fn add_result(&mut self, agent_name: &str, result: &str) {
        match self.results.iter_mut().find(|(name, _)| name.as_str() == agent_name) {
            Some((_, existing)) => *existing = result.to_string(),
            None => self.results.push((agent_name.to_string(), result.to_string())),
        }
        self.add_message(AgentMessage::new(agent_name, "system", result, MessageKind::Result));
    }

    pub fn result(&self, agent_name: &str) -> Option<&str> {
        self.results
            .iter()
            .find(|(name, _)| name.as_str() == agent_name)
            .map(|(_, result)| result.as_str())
    }

    /// `(agent, result)` pairs in completion order.
    pub fn results(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results.iter().map(|(n, r)| (n.as_str(), r.as_str()))
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    /// All results as one text block, for use in prompts.
    pub fn all_results_text(&self) -> String {
        if self.results.is_empty() {
            return "(no results yet)".to_string();
        }
        self.results
            .iter()
            .map(|(name, result)| format!("[{name}] result:\n{result}"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn messages(&self) -> &[AgentMessage] {
        &self.messages
    }

    /// Messages addressed to `receiver`, including broadcasts.
    pub fn messages_for(&self, receiver: &str) -> Vec<&AgentMessage> {
        self.messages
            .iter()
            .filter(|m| m.receiver == receiver || m.receiver == BROADCAST)
            .collect()
    }

    /// Clear everything except `max_steps`.
    pub fn reset(&mut self) {
        *self = Self {
            max_steps: self.max_steps,
            ..Self::default()
        };
    }

    pub fn summary(&self) -> String {
        format!(
            "status: {} | steps: {}/{} | results: {} | messages: {}",
            self.status,
            self.current_step,
            self.max_steps,
            self.results.len(),
            self.messages.len()
        )
    }
}

impl std::fmt::Display for SharedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedState({})", self.summary())
    }
}
