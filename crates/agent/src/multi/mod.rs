//! Multi-agent coordination.
//!
//! A [`Coordinator`] owns one [`ReactAgent`](crate::react::ReactAgent) per
//! role, the [`SharedState`] blackboard, and the [`Hooks`]. Strategies
//! decide who gets which sub-task:
//!
//! - [`Pipeline`]: fixed sequence, each step fed the previous result
//! - [`Orchestrator`]: model-generated plan, optional replanning, summary
//! - [`Debate`]: rounds of opinions, then a judge

pub mod coordinator;
pub mod debate;
pub mod hooks;
pub mod message;
pub mod orchestrator;
pub mod pipeline;
pub mod roles;
pub mod shared_state;

pub use coordinator::{AgentDefaults, AgentOverrides, Coordinator};
pub use debate::{Debate, Round};
pub use hooks::{HookEvent, HookKind, Hooks};
pub use message::{render_template, AgentMessage, MessageKind, PipelineStep, Transform, BROADCAST};
pub use orchestrator::{parse_plan, Orchestrator, PlanStep, PLAN_FAILED};
pub use pipeline::Pipeline;
pub use roles::{builtin_roles, get_role, AgentRole, RoleCatalog};
pub use shared_state::{SharedState, Status};

use async_trait::async_trait;
use troupe_core::error::CoordinationError;

/// A coordination policy over a [`Coordinator`].
///
/// Only misconfiguration is an `Err`. Agent failures come back inside the
/// returned text as `error: ...` results.
#[async_trait]
pub trait Strategy: Send {
    fn name(&self) -> &'static str;

    fn coordinator(&self) -> &Coordinator;

    fn coordinator_mut(&mut self) -> &mut Coordinator;

    async fn run(&mut self, task: &str) -> Result<String, CoordinationError>;
}
