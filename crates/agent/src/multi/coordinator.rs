//! Coordination base shared by every strategy.
//!
//! ```text
//!            task
//!              │
//!              ▼
//!     ┌─────────────────┐
//!     │   Coordinator    │  ← agents, shared state, hooks
//!     └──┬──────┬───────┘
//!        │      │  dispatch(name, sub-task)
//!        ▼      ▼
//!     ┌──────┐ ┌──────┐
//!     │ A-1  │ │ A-2  │  ← one ReactAgent per role, role-scoped tools
//!     └──────┘ └──────┘
//! ```
//!
//! [`Coordinator::dispatch`] never fails. A missing agent, a failing model
//! call, or even a panic inside an agent run comes back as an
//! `error: ...` string and is recorded like any other result.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use troupe_core::error::{CoordinationError, ProviderError, ERROR_PREFIX};
use troupe_core::history::DEFAULT_MAX_TURNS;
use troupe_core::message::Message;
use troupe_core::provider::{Provider, ProviderRequest};
use troupe_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

use super::hooks::{HookEvent, HookKind, Hooks};
use super::message::{preview, AgentMessage, MessageKind, BROADCAST};
use super::roles::AgentRole;
use super::shared_state::SharedState;
use crate::react::ReactAgent;

const LOG_PREVIEW_CHARS: usize = 200;

/// Per-agent settings that differ from the coordinator defaults.
#[derive(Debug, Clone, Default)]
pub struct AgentOverrides {
    /// Protocol mode name.
    pub mode: Option<String>,
    pub max_steps: Option<u32>,
}

/// Settings applied to every agent the coordinator creates.
#[derive(Debug, Clone)]
pub struct AgentDefaults {
    pub mode: String,
    pub max_steps: u32,
    pub history_turns: usize,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            mode: "function_calling".into(),
            max_steps: 10,
            history_turns: DEFAULT_MAX_TURNS,
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

struct RoleAgent {
    role: AgentRole,
    agent: ReactAgent,
}

/// Owns the agents, the blackboard, and the hooks of one strategy.
pub struct Coordinator {
    provider: Arc<dyn Provider>,
    model: String,
    /// Global registry; role registries are views over it.
    tools: ToolRegistry,
    defaults: AgentDefaults,
    agents: Vec<RoleAgent>,
    state: SharedState,
    hooks: Hooks,
}

impl Coordinator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, tools: ToolRegistry) -> Self {
        Self {
            provider,
            model: model.into(),
            tools,
            defaults: AgentDefaults::default(),
            agents: Vec::new(),
            state: SharedState::new(),
            hooks: Hooks::new(),
        }
    }

    /// Defaults for agents added after this call.
    pub fn with_defaults(mut self, defaults: AgentDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Register an agent for `role` using the default settings.
    pub fn add_agent(&mut self, role: AgentRole) -> Result<(), CoordinationError> {
        self.add_agent_with(role, AgentOverrides::default())
    }

    /// Register an agent for `role`. A role with a taken name replaces the
    /// existing agent.
    pub fn add_agent_with(
        &mut self,
        role: AgentRole,
        overrides: AgentOverrides,
    ) -> Result<(), CoordinationError> {
        let mode = overrides.mode.as_deref().unwrap_or(self.defaults.mode.as_str());
        let scoped = self.tools.scoped(&role.tools);

        let mut agent = ReactAgent::new(Arc::clone(&self.provider), self.model.clone(), scoped)
            .with_mode_name(mode)?
            .with_max_steps(overrides.max_steps.unwrap_or(self.defaults.max_steps))
            .with_history_turns(self.defaults.history_turns)
            .with_temperature(self.defaults.temperature);
        if let Some(max_tokens) = self.defaults.max_tokens {
            agent = agent.with_max_tokens(max_tokens);
        }

        debug!(agent = %role.name, tools = ?agent.tools().names(), mode, "Registered agent");

        let entry = RoleAgent { role, agent };
        match self.agents.iter_mut().find(|a| a.role.name == entry.role.name) {
            Some(existing) => *existing = entry,
            None => self.agents.push(entry),
        }
        Ok(())
    }

    pub fn get_agent(&self, name: &str) -> Option<&ReactAgent> {
        self.agents.iter().find(|a| a.role.name == name).map(|a| &a.agent)
    }

    pub fn role(&self, name: &str) -> Option<&AgentRole> {
        self.agents.iter().find(|a| a.role.name == name).map(|a| &a.role)
    }

    /// Registered agent names, in registration order.
    pub fn agent_names(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.role.name.clone()).collect()
    }

    pub fn has_agent(&self, name: &str) -> bool {
        self.agents.iter().any(|a| a.role.name == name)
    }

    pub fn roles(&self) -> impl Iterator<Item = &AgentRole> {
        self.agents.iter().map(|a| &a.role)
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SharedState {
        &mut self.state
    }

    /// Register an event handler.
    pub fn on(&mut self, kind: HookKind, handler: impl Fn(&HookEvent<'_>) + Send + Sync + 'static) {
        self.hooks.on(kind, handler);
    }

    /// Fire `StepComplete` with the current state.
    pub(crate) fn step_complete(&self, step: usize) {
        self.hooks.fire(&HookEvent::StepComplete {
            step,
            state: &self.state,
        });
    }

    /// Log `message` as addressed to every agent.
    pub fn broadcast(&mut self, mut message: AgentMessage) {
        message.receiver = BROADCAST.to_string();
        self.state.add_message(message);
    }

    /// Hand `task` to the agent called `agent_name` and return its answer.
    ///
    /// The agent's history is cleared afterwards, so role agents carry no
    /// memory between dispatches.
    pub async fn dispatch(&mut self, agent_name: &str, task: &str) -> String {
        let Some(index) = self.agents.iter().position(|a| a.role.name == agent_name) else {
            let error = format!(
                "{ERROR_PREFIX}agent '{agent_name}' does not exist. Available: {:?}",
                self.agent_names()
            );
            warn!(agent = agent_name, "Dispatch to unknown agent");
            self.hooks.fire(&HookEvent::Error {
                agent: agent_name,
                error: &error,
            });
            return error;
        };

        self.hooks.fire(&HookEvent::AgentStart {
            agent: agent_name,
            task,
        });
        self.state
            .add_message(AgentMessage::new("system", agent_name, task, MessageKind::Task));

        let entry = &mut self.agents[index];
        let full_task = if entry.role.system_prompt.is_empty() {
            task.to_string()
        } else {
            format!(
                "[System role instructions]\n{}\n\n[Current task]\n{}",
                entry.role.system_prompt, task
            )
        };

        let outcome = AssertUnwindSafe(entry.agent.run(&full_task))
            .catch_unwind()
            .await;

        let result = match outcome {
            Ok(Ok(run)) => run.answer,
            Ok(Err(e)) => {
                let error = format!("{ERROR_PREFIX}agent '{agent_name}' failed: {e}");
                warn!(agent = agent_name, error = %e, "Agent run failed");
                self.hooks.fire(&HookEvent::Error {
                    agent: agent_name,
                    error: &error,
                });
                error
            }
            Err(panic) => {
                let error = format!(
                    "{ERROR_PREFIX}agent '{agent_name}' failed: {}",
                    panic_message(panic.as_ref())
                );
                warn!(agent = agent_name, "Agent run panicked");
                self.hooks.fire(&HookEvent::Error {
                    agent: agent_name,
                    error: &error,
                });
                error
            }
        };

        self.agents[index].agent.reset();
        self.state.add_result(agent_name, &result);
        self.hooks.fire(&HookEvent::AgentFinish {
            agent: agent_name,
            result: &result,
        });
        result
    }

    /// One model call outside any agent: an optional system prompt plus
    /// a single user message, no tools.
    pub async fn complete_text(
        &self,
        system: Option<&str>,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(prompt));

        let mut request = ProviderRequest::new(self.model.clone(), messages);
        request.temperature = self.defaults.temperature;
        request.max_tokens = self.defaults.max_tokens;

        let response = self.provider.complete(request).await?;
        Ok(response.message.content)
    }

    pub(crate) fn log_header(&self, title: &str) {
        info!("==== {title} ====");
    }

    pub(crate) fn log_agent(&self, agent: &str, action: &str, detail: &str) {
        if detail.is_empty() {
            info!(agent, "{action}");
        } else {
            info!(agent, detail = %preview(detail, LOG_PREVIEW_CHARS), "{action}");
        }
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("agents", &self.agent_names())
            .field("state", &self.state.summary())
            .field("hooks", &self.hooks)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "agent panicked".to_string()
    }
}
