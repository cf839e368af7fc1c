//! Debate: debaters argue over several rounds, then a judge rules.
//!
//! ```text
//! round 1: every debater answers the topic on its own
//! round n: every debater answers the others' earlier opinions
//! verdict: the judge reads the whole transcript
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use troupe_core::error::CoordinationError;
use troupe_core::provider::Provider;
use troupe_core::tool::ToolRegistry;
use tracing::info;

use super::coordinator::{AgentOverrides, Coordinator};
use super::message::{render_template, AgentMessage, MessageKind, BROADCAST};
use super::roles::AgentRole;
use super::shared_state::Status;
use super::Strategy;

const DEFAULT_MAX_ROUNDS: u32 = 2;

const JUDGE_PROMPT: &str = "You are an impartial judge. Several experts debated the \
topic below. Weigh every position and deliver a final ruling.

Original topic: {topic}

{transcript}

Please:
1. Summarize each side's core position and arguments
2. Analyze the strengths and weaknesses of each position
3. Give your final conclusion and recommendation
4. Explain the reasoning behind your ruling

Be objective and fair, support your points, and state a clear conclusion.";

/// Opinions of one round, in debater order.
pub type Round = Vec<(String, String)>;

/// Multi-round debate with a judge.
#[derive(Debug)]
pub struct Debate {
    coordinator: Coordinator,
    max_rounds: u32,
    judge: Option<String>,
    debaters: Vec<String>,
    rounds: Vec<Round>,
}

impl Debate {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, tools: ToolRegistry) -> Self {
        Self::with_coordinator(Coordinator::new(provider, model, tools))
    }

    pub fn with_coordinator(coordinator: Coordinator) -> Self {
        Self {
            coordinator,
            max_rounds: DEFAULT_MAX_ROUNDS,
            judge: None,
            debaters: Vec::new(),
            rounds: Vec::new(),
        }
    }

    /// Number of debate rounds, not counting the verdict.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn set_judge(&mut self, role: AgentRole) -> Result<(), CoordinationError> {
        let name = role.name.clone();
        self.coordinator.add_agent(role)?;
        self.judge = Some(name);
        Ok(())
    }

    pub fn add_debater(&mut self, role: AgentRole) -> Result<(), CoordinationError> {
        self.add_debater_with(role, AgentOverrides::default())
    }

    pub fn add_debater_with(
        &mut self,
        role: AgentRole,
        overrides: AgentOverrides,
    ) -> Result<(), CoordinationError> {
        let name = role.name.clone();
        self.coordinator.add_agent_with(role, overrides)?;
        if !self.debaters.contains(&name) {
            self.debaters.push(name);
        }
        Ok(())
    }

    pub fn debaters(&self) -> &[String] {
        &self.debaters
    }

    pub fn judge(&self) -> Option<&str> {
        self.judge.as_deref()
    }

    /// Opinions of the last run, one entry per round.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    fn round_task(&self, topic: &str, round: u32, debater: &str) -> String {
        if round == 1 {
            return format!(
                "Give your view on the following topic:\n\n{topic}\n\n\
                 State your core position, your arguments, and your conclusion."
            );
        }
        format!(
            "Topic: {topic}\n\n\
             Opinions of the other participants in earlier rounds:\n{}\n\n\
             Respond to the other participants: rebut, extend, or revise your own position. \
             Give your updated core position and arguments.",
            format_opinions(&self.rounds, debater)
        )
    }
}

#[async_trait]
impl Strategy for Debate {
    fn name(&self) -> &'static str {
        "debate"
    }

    fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.coordinator
    }

    async fn run(&mut self, topic: &str) -> Result<String, CoordinationError> {
        if self.debaters.is_empty() {
            return Err(CoordinationError::MissingDebaters);
        }
        let Some(judge) = self.judge.clone() else {
            return Err(CoordinationError::MissingJudge);
        };

        {
            let state = self.coordinator.state_mut();
            state.reset();
            state.task = topic.to_string();
            state.status = Status::Executing;
        }
        self.rounds.clear();

        self.coordinator.log_header(&format!("Debate: {topic}"));
        info!(debaters = ?self.debaters, judge = %judge, rounds = self.max_rounds, "Debate starting");

        let debaters = self.debaters.clone();
        for round in 1..=self.max_rounds {
            self.coordinator.state_mut().current_step = round as usize;
            info!(round, "Debate round");

            let mut opinions = Round::with_capacity(debaters.len());
            for debater in &debaters {
                let sub_task = self.round_task(topic, round, debater);
                let opinion = self.coordinator.dispatch(debater, &sub_task).await;
                self.coordinator.log_agent(debater, "Opinion", &opinion);

                self.coordinator.broadcast(
                    AgentMessage::new(debater.as_str(), BROADCAST, opinion.as_str(), MessageKind::Result)
                        .with_metadata("round", round),
                );
                opinions.push((debater.clone(), opinion));
            }

            self.rounds.push(opinions);
            self.coordinator.step_complete(round as usize);
        }

        self.coordinator.state_mut().status = Status::Reviewing;
        info!(judge = %judge, "Judge deliberating");
        let prompt = render_template(
            JUDGE_PROMPT,
            &[("topic", topic), ("transcript", &format_transcript(&self.rounds))],
        );
        let verdict = self.coordinator.dispatch(&judge, &prompt).await;
        self.coordinator.log_agent(&judge, "Verdict", &verdict);

        self.coordinator.state_mut().status = Status::Done;
        self.coordinator.log_header("Debate complete");
        info!(summary = %self.coordinator.state().summary());
        Ok(verdict)
    }
}

/// Opinions from every earlier round, leaving out `exclude`'s own.
fn format_opinions(rounds: &[Round], exclude: &str) -> String {
    let lines: Vec<String> = rounds
        .iter()
        .enumerate()
        .flat_map(|(i, round)| {
            round
                .iter()
                .filter(move |(name, _)| name.as_str() != exclude)
                .map(move |(name, opinion)| format!("[Round {} - {name}]:\n{opinion}\n", i + 1))
        })
        .collect();

    if lines.is_empty() {
        "(no other opinions yet)".to_string()
    } else {
        lines.join("\n")
    }
}

/// Full transcript for the judge.
fn format_transcript(rounds: &[Round]) -> String {
    let mut lines = Vec::new();
    for (i, round) in rounds.iter().enumerate() {
        lines.push(format!("=== Round {} ===", i + 1));
        for (name, opinion) in round {
            lines.push(format!("\n[{name}]:\n{opinion}\n"));
        }
    }
    lines.join("\n")
}
