//! Orchestrator: a planner call splits the task, role agents execute the
//! steps, and a summarizer call folds the results into one answer.
//!
//! ```text
//! task ─▶ [plan] ─▶ step 1 ─▶ [agent A] ─▶ step 2 ─▶ [agent B] ─▶ … ─▶ [summarize]
//!                       ▲                                  │
//!                       └──────── replan on failure ◀──────┘
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;
use troupe_core::error::{CoordinationError, ERROR_PREFIX};
use troupe_core::provider::Provider;
use troupe_core::tool::ToolRegistry;
use tracing::{info, warn};

use super::coordinator::Coordinator;
use super::message::{preview, render_template};
use super::shared_state::Status;
use super::Strategy;

const DEFAULT_MAX_REPLAN: u32 = 2;

/// Returned when the planner produces no usable plan.
pub const PLAN_FAILED: &str = "error: cannot generate plan.";

const PLANNER_PROMPT: &str = "You are an expert at planning and orchestrating tasks. \
Break the complex task into sub-tasks and assign each one to a suitable agent.

Available agents:
{agents}

Output the execution plan as JSON in exactly this format:
```json
[
  {{\"agent\": \"agent_name\", \"task\": \"concrete sub-task description\"}},
  {{\"agent\": \"agent_name\", \"task\": \"concrete sub-task description\"}}
]
```

Rules:
- Make every sub-task concrete enough for its agent to act on directly
- Order the steps sensibly; later steps may depend on earlier results
- The agent name must be one of the available agents
- Output only the JSON, nothing else";

const REPLAN_PROMPT: &str = "Original task:
{task}

Results so far:
{results}

The step assigned to '{agent}' failed with:
{failure}

Produce a new plan for the remaining work in the same JSON format.";

const SUMMARIZER_PROMPT: &str = "You are an expert at synthesis. Using the results of \
the agents below, produce one complete, well-structured final answer.

Original task: {task}

Agent results:
{results}

Combine the information above into a complete final answer:
- Use a clear structure with headings and lists
- Cover every key point the agents provided
- Keep the language concise and professional";

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlanStep {
    pub agent: String,
    pub task: String,
}

/// Plans with the model, dispatches, and summarizes.
#[derive(Debug)]
pub struct Orchestrator {
    coordinator: Coordinator,
    max_replan: u32,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, tools: ToolRegistry) -> Self {
        Self::with_coordinator(Coordinator::new(provider, model, tools))
    }

    pub fn with_coordinator(coordinator: Coordinator) -> Self {
        Self {
            coordinator,
            max_replan: DEFAULT_MAX_REPLAN,
        }
    }

    /// How many times a failed step may trigger a new plan. Zero disables
    /// replanning.
    pub fn with_max_replan(mut self, max_replan: u32) -> Self {
        self.max_replan = max_replan;
        self
    }

    pub fn max_replan(&self) -> u32 {
        self.max_replan
    }

    fn planner_prompt(&self) -> String {
        let agents = self
            .coordinator
            .roles()
            .map(|role| {
                let head: String = role.system_prompt.chars().take(80).collect();
                format!("- {}: {}...", role.name, head)
            })
            .collect::<Vec<_>>()
            .join("\n");
        render_template(PLANNER_PROMPT, &[("agents", &agents)])
    }

    async fn plan(&self, prompt: &str) -> Vec<PlanStep> {
        info!("Planning");
        match self
            .coordinator
            .complete_text(Some(&self.planner_prompt()), prompt)
            .await
        {
            Ok(reply) => {
                info!(reply = %preview(&reply, 300), "Planner replied");
                parse_plan(&reply)
            }
            Err(e) => {
                warn!(error = %e, "Planner call failed");
                Vec::new()
            }
        }
    }

    async fn summarize(&mut self, task: &str) -> String {
        let prompt = render_template(
            SUMMARIZER_PROMPT,
            &[("task", task), ("results", &self.coordinator.state().all_results_text())],
        );
        match self.coordinator.complete_text(None, &prompt).await {
            Ok(answer) => {
                self.coordinator.state_mut().status = Status::Done;
                answer
            }
            Err(e) => {
                warn!(error = %e, "Summarizer call failed");
                self.coordinator.state_mut().status = Status::Failed;
                format!("{ERROR_PREFIX}summarization failed: {e}")
            }
        }
    }
}

#[async_trait]
impl Strategy for Orchestrator {
    fn name(&self) -> &'static str {
        "orchestrator"
    }

    fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.coordinator
    }

    async fn run(&mut self, task: &str) -> Result<String, CoordinationError> {
        {
            let state = self.coordinator.state_mut();
            state.reset();
            state.task = task.to_string();
            state.status = Status::Planning;
        }
        self.coordinator.log_header(&format!("Orchestrator: {task}"));
        info!(agents = ?self.coordinator.agent_names(), "Available agents");

        let plan = self.plan(task).await;
        if plan.is_empty() {
            self.coordinator.state_mut().status = Status::Failed;
            return Ok(PLAN_FAILED.to_string());
        }
        set_plan_text(&mut self.coordinator, &plan, 0);
        info!(steps = plan.len(), "Plan ready");

        self.coordinator.state_mut().status = Status::Executing;
        let mut pending: VecDeque<PlanStep> = plan.into();
        let mut number = 0;
        let mut replans = 0;

        while let Some(step) = pending.pop_front() {
            number += 1;
            self.coordinator.state_mut().current_step = number;
            self.coordinator.log_agent(&step.agent, "Received task", &step.task);

            if !self.coordinator.has_agent(&step.agent) {
                warn!(agent = %step.agent, "Planned agent does not exist; skipping");
                continue;
            }

            let mut sub_task = step.task.clone();
            if self.coordinator.state().has_results() {
                sub_task.push_str("\n\n[Reference] results of previous steps:\n");
                sub_task.push_str(&self.coordinator.state().all_results_text());
            }

            let result = self.coordinator.dispatch(&step.agent, &sub_task).await;
            self.coordinator.log_agent(&step.agent, "Returned result", &result);
            self.coordinator.step_complete(number);

            if result.starts_with(ERROR_PREFIX) && replans < self.max_replan {
                replans += 1;
                let prompt = render_template(
                    REPLAN_PROMPT,
                    &[
                        ("task", task),
                        ("results", &self.coordinator.state().all_results_text()),
                        ("agent", &step.agent),
                        ("failure", &result),
                    ],
                );
                let replan = self.plan(&prompt).await;
                if replan.is_empty() {
                    info!(replans, "Replan produced nothing; keeping the current plan");
                } else {
                    info!(replans, steps = replan.len(), "Replanned");
                    set_plan_text(&mut self.coordinator, &replan, number);
                    pending = replan.into();
                }
            }
        }

        self.coordinator.state_mut().status = Status::Reviewing;
        info!("Summarizing");
        let answer = self.summarize(task).await;

        self.coordinator.log_header("Orchestrator complete");
        info!(summary = %self.coordinator.state().summary());
        Ok(answer)
    }
}

/// Keep the first `keep` plan entries and append `steps`.
fn set_plan_text(coordinator: &mut Coordinator, steps: &[PlanStep], keep: usize) {
    let plan = &mut coordinator.state_mut().plan;
    plan.truncate(keep);
    plan.extend(steps.iter().map(|s| format!("{}: {}", s.agent, s.task)));
}

/// Extract a plan from a planner reply.
///
/// Takes the text from the first `[` to the last `]` and parses it as a
/// JSON array. Entries without string `agent` and `task` fields are
/// dropped; anything unparsable yields an empty plan.
pub fn parse_plan(text: &str) -> Vec<PlanStep> {
    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(&text[start..=end]) else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<PlanStep>(item).ok())
        .collect()
}
