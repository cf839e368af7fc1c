//! Sequential pipeline: each agent works on the previous agent's output.
//!
//! ```text
//! task ─▶ [researcher] ─▶ [analyst] ─▶ [writer] ─▶ result
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use troupe_core::error::{CoordinationError, ERROR_PREFIX};
use troupe_core::provider::Provider;
use troupe_core::tool::ToolRegistry;
use tracing::{info, warn};

use super::coordinator::Coordinator;
use super::message::PipelineStep;
use super::shared_state::Status;
use super::Strategy;

/// Runs a fixed list of steps in order.
#[derive(Debug)]
pub struct Pipeline {
    coordinator: Coordinator,
    steps: Vec<PipelineStep>,
}

impl Pipeline {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, tools: ToolRegistry) -> Self {
        Self::with_coordinator(Coordinator::new(provider, model, tools))
    }

    pub fn with_coordinator(coordinator: Coordinator) -> Self {
        Self {
            coordinator,
            steps: Vec::new(),
        }
    }

    pub fn add_step(&mut self, step: PipelineStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }
}

#[async_trait]
impl Strategy for Pipeline {
    fn name(&self) -> &'static str {
        "pipeline"
    }

    fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.coordinator
    }

    async fn run(&mut self, task: &str) -> Result<String, CoordinationError> {
        if self.steps.is_empty() {
            return Err(CoordinationError::EmptyPipeline);
        }

        let coord = &mut self.coordinator;
        coord.log_header(&format!("Pipeline: {task}"));

        let state = coord.state_mut();
        state.reset();
        state.task = task.to_string();
        state.status = Status::Executing;
        state.plan = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, s)| format!("Step {}: {}", i + 1, s.agent_name))
            .collect();

        let mut prev_result = String::new();
        for (i, step) in self.steps.iter().enumerate() {
            let number = i + 1;
            coord.state_mut().current_step = number;
            info!(step = number, total = self.steps.len(), agent = %step.agent_name, "Pipeline step");

            let sub_task = step.render(task, &prev_result, &coord.state().all_results_text());
            coord.log_agent(&step.agent_name, "Received task", &sub_task);

            let attempts = step.retry.max(1);
            let mut result = String::new();
            for attempt in 1..=attempts {
                result = coord.dispatch(&step.agent_name, &sub_task).await;
                if !result.starts_with(ERROR_PREFIX) {
                    break;
                }
                if attempt < attempts {
                    warn!(agent = %step.agent_name, attempt, "Step failed; retrying");
                }
            }
            coord.log_agent(&step.agent_name, "Returned result", &result);

            if let Some(transform) = &step.transform {
                result = transform(result);
            }

            coord.step_complete(number);
            prev_result = result;
        }

        coord.state_mut().status = Status::Done;
        coord.log_header("Pipeline complete");
        Ok(prev_result)
    }
}
