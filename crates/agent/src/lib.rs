//! Agents for troupe.
//!
//! - [`react`]: the single-agent Thought → Action → Observation loop
//! - [`multi`]: role agents composed into pipelines, orchestrations, and
//!   debates

pub mod multi;
pub mod react;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use multi::{
    AgentRole, Coordinator, Debate, HookEvent, HookKind, Orchestrator, Pipeline, PipelineStep,
    RoleCatalog, SharedState, Status, Strategy,
};
pub use react::{protocol_for, ReactAgent, ReactProtocol, ReactResult, FALLBACK_ANSWER};
