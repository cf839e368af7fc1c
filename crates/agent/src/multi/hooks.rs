//! Event hooks for observing a coordinator.
//!
//! Handlers run synchronously inside the coordinator. A panicking handler
//! is logged and skipped; it never reaches the strategy that fired it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

use super::shared_state::SharedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    AgentStart,
    AgentFinish,
    StepComplete,
    Error,
}

/// Payload delivered to handlers.
#[derive(Debug, Clone, Copy)]
pub enum HookEvent<'a> {
    AgentStart { agent: &'a str, task: &'a str },
    AgentFinish { agent: &'a str, result: &'a str },
    StepComplete { step: usize, state: &'a SharedState },
    Error { agent: &'a str, error: &'a str },
}

impl HookEvent<'_> {
    pub fn kind(&self) -> HookKind {
        match self {
            Self::AgentStart { .. } => HookKind::AgentStart,
            Self::AgentFinish { .. } => HookKind::AgentFinish,
            Self::StepComplete { .. } => HookKind::StepComplete,
            Self::Error { .. } => HookKind::Error,
        }
    }
}

type Handler = Box<dyn Fn(&HookEvent<'_>) + Send + Sync>;

/// Handlers registered per event kind, called in registration order.
#[derive(Default)]
pub struct Hooks {
    handlers: Vec<(HookKind, Handler)>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, kind: HookKind, handler: impl Fn(&HookEvent<'_>) + Send + Sync + 'static) {
        self.handlers.push((kind, Box::new(handler)));
    }

    pub fn fire(&self, event: &HookEvent<'_>) {
        let kind = event.kind();
        for (_, handler) in self.handlers.iter().filter(|(k, _)| *k == kind) {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                warn!(event = ?kind, "Hook handler panicked; ignoring");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("handlers", &self.handlers.iter().map(|(k, _)| *k).collect::<Vec<_>>())
            .finish()
    }
}
