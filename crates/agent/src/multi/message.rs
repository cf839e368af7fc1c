//! Inter-agent messages and pipeline step descriptors.
//!
//! Messages are an audit log of who handed what to whom. Nothing reads
//! them for control flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Receiver name denoting a broadcast.
pub const BROADCAST: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// A task handed to an agent.
    Task,
    /// An agent's output.
    Result,
    /// Review comments.
    Feedback,
    /// Status changes and other system notices.
    System,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Result => "result",
            Self::Feedback => "feedback",
            Self::System => "system",
        }
    }
}

/// One record in the coordination message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub sender: String,
    /// Receiver name, or [`BROADCAST`].
    pub receiver: String,
    pub content: String,
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        content: impl Into<String>,
        kind: MessageKind,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            content: content.into(),
            kind,
            metadata: serde_json::Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_broadcast(&self) -> bool {
        self.receiver == BROADCAST
    }
}

impl std::fmt::Display for AgentMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Message({} -> {}, type={}, content={:?})",
            self.sender,
            self.receiver,
            self.kind.as_str(),
            preview(&self.content, 60)
        )
    }
}

/// Truncate to `max` characters, marking the cut with "...".
pub(crate) fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Post-processing applied to a pipeline step's result.
pub type Transform = Arc<dyn Fn(String) -> String + Send + Sync>;

/// One stage of a pipeline.
///
/// The template may reference `{task}`, `{prev_result}` and
/// `{all_results}`. Unknown placeholders are kept verbatim and `{{` / `}}`
/// render as literal braces.
#[derive(Clone)]
pub struct PipelineStep {
    pub agent_name: String,
    pub task_template: String,
    /// Dispatch attempts; only error results are retried.
    pub retry: u32,
    pub transform: Option<Transform>,
}

impl PipelineStep {
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            task_template: "{task}".into(),
            retry: 1,
            transform: None,
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.task_template = template.into();
        self
    }

    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_transform(mut self, transform: impl Fn(String) -> String + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Fill the template.
    pub fn render(&self, task: &str, prev_result: &str, all_results: &str) -> String {
        render_template(
            &self.task_template,
            &[("task", task), ("prev_result", prev_result), ("all_results", all_results)],
        )
    }
}

impl std::fmt::Debug for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineStep")
            .field("agent_name", &self.agent_name)
            .field("task_template", &self.task_template)
            .field("retry", &self.retry)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// Substitute `{name}` placeholders from `values`.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('{') {
            if let Some(end) = tail.find('}') {
                let key = &tail[1..end];
                if let Some((_, value)) = values.iter().find(|(name, _)| *name == key) {
                    out.push_str(value);
                    rest = &tail[end + 1..];
                    continue;
                }
            }
        }

        // Lone brace or unknown placeholder: keep the brace and move on.
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}
