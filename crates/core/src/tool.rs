//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are what give an agent the ability to act: evaluate arithmetic,
//! look up data, search. A [`ToolRegistry`] owns them and exposes a uniform
//! invocation and schema-export interface to the reasoning loop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use crate::error::{ToolError, ERROR_PREFIX};
use crate::provider::ToolDefinition;

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the model's invocation id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content
    pub output: String,

    /// Optional structured data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// A successful result with text output only.
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            call_id: String::new(),
            success: true,
            output: output.into(),
            data: None,
        }
    }
}

/// The core Tool trait.
///
/// Tools are stateless with respect to the agent that calls them. They are
/// registered in a [`ToolRegistry`] and made available to the ReAct loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "calculator").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// Tools are held behind `Arc` so that a role-scoped registry produced by
/// [`ToolRegistry::scoped`] is an index over the very same tool instances.
/// Names are unique; registering a second tool under a taken name fails.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if a tool with the same name is present.
    pub fn register(&mut self, tool: impl Tool + 'static) -> std::result::Result<(), ToolError> {
        self.register_shared(Arc::new(tool))
    }

    /// Register an already shared tool instance.
    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) -> std::result::Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::AlreadyRegistered(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Build a registry restricted to `allowed` names.
    ///
    /// The subset shares tool instances with `self`. Names that are not
    /// registered here are skipped.
    pub fn scoped<S: AsRef<str>>(&self, allowed: &[S]) -> ToolRegistry {
        let mut subset = ToolRegistry::new();
        for name in allowed {
            let Some(tool) = self.get_shared(name.as_ref()) else {
                debug!(tool = name.as_ref(), "Skipping unknown tool in scoped registry");
                continue;
            };
            // Duplicates in `allowed` collapse to a single entry.
            let _ = subset.register_shared(tool);
        }
        subset
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }

    fn get_shared(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| Arc::clone(&self.tools[i]))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all tool definitions (for sending to the LLM).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Human-readable catalogue of every tool, used by text-only prompts.
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|t| {
                let params = serde_json::to_string_pretty(&t.parameters_schema())
                    .unwrap_or_else(|_| "{}".into());
                format!("- **{}**: {}\n  Parameters: {}", t.name(), t.description(), params)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Execute a tool call, surfacing failures as typed errors.
    pub async fn execute(&self, call: &ToolCall) -> std::result::Result<ToolResult, ToolError> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        if !call.arguments.is_object() {
            return Err(ToolError::InvalidArguments(format!(
                "arguments for '{}' must be a JSON object",
                call.name
            )));
        }
        let mut result = tool.execute(call.arguments.clone()).await?;
        result.call_id = call.id.clone();
        Ok(result)
    }

    /// Execute a tool whose arguments arrive as raw JSON text.
    ///
    /// Never fails: a missing tool, unparsable arguments, or a tool error
    /// become an observation starting with [`ERROR_PREFIX`].
    pub async fn execute_text(&self, name: &str, raw_arguments: &str) -> String {
        let raw = raw_arguments.trim();
        let arguments = if raw.is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(value) => value,
                Err(_) if !self.contains(name) => return self.not_found(name),
                Err(_) => {
                    return format!(
                        "{ERROR_PREFIX}could not parse arguments for tool '{name}' as JSON: {raw_arguments}"
                    );
                }
            }
        };
        self.execute_value(name, arguments).await
    }

    /// Execute a tool with pre-parsed arguments; failures become text.
    pub async fn execute_value(&self, name: &str, arguments: serde_json::Value) -> String {
        let call = ToolCall {
            id: String::new(),
            name: name.to_string(),
            arguments,
        };
        match self.execute(&call).await {
            Ok(result) => result.output,
            Err(ToolError::NotFound(_)) => self.not_found(name),
            Err(e) => format!("{ERROR_PREFIX}tool '{name}' failed: {e}"),
        }
    }

    fn not_found(&self, name: &str) -> String {
        format!(
            "{ERROR_PREFIX}tool '{name}' not found. Available tools: {:?}",
            self.names()
        )
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolResult, ToolError> {
            let text = arguments["text"]
                .as_str()
                .ok_or_else(|| ToolError::InvalidArguments("missing 'text'".into()))?;
            Ok(ToolResult::text(text))
        }
    }

    struct UpperTool;

    #[async_trait]
    impl Tool for UpperTool {
        fn name(&self) -> &str { "upper" }
        fn description(&self) -> &str { "Uppercases the input" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }
        async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolResult, ToolError> {
            Ok(ToolResult::text(arguments["text"].as_str().unwrap_or("").to_uppercase()))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();
        registry.register(UpperTool).unwrap();
        registry
    }

    #[test]
    fn registry_register_and_lookup() {
        let registry = registry();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.names(), vec!["echo", "upper"]);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = registry();
        let err = registry.register(EchoTool).unwrap_err();
        assert!(matches!(err, ToolError::AlreadyRegistered(ref n) if n == "echo"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn registry_definitions_cover_every_tool() {
        let defs = registry().definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "echo");
        assert_eq!(defs[1].name, "upper");
    }

    #[test]
    fn scoped_registry_shares_instances() {
        let registry = registry();
        let scoped = registry.scoped(&["upper", "missing"]);
        assert_eq!(scoped.names(), vec!["upper"]);
        let a = registry.get_shared("upper").unwrap();
        let b = scoped.get_shared("upper").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn describe_lists_parameters() {
        let text = registry().describe();
        assert!(text.contains("**echo**"));
        assert!(text.contains("Parameters"));
        assert!(text.contains("\"text\""));
    }

    #[tokio::test]
    async fn registry_execute_tool() {
        let call = ToolCall {
            id: "call_1".into(),
            name: "echo".into(),
            arguments: serde_json::json!({"text": "hello world"}),
        };
        let result = registry().execute(&call).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "hello world");
        assert_eq!(result.call_id, "call_1");
    }

    #[tokio::test]
    async fn registry_execute_missing_tool() {
        let call = ToolCall {
            id: "call_1".into(),
            name: "nonexistent".into(),
            arguments: serde_json::json!({}),
        };
        let err = registry().execute(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn execute_text_converts_failures_to_observations() {
        let registry = registry();

        let ok = registry.execute_text("echo", r#"{"text": "hi"}"#).await;
        assert_eq!(ok, "hi");

        let missing = registry.execute_text("nope", "{}").await;
        assert!(missing.starts_with(ERROR_PREFIX));
        assert!(missing.contains("nope"));
        assert!(missing.contains("echo"));

        let bad_json = registry.execute_text("echo", "{not json").await;
        assert!(bad_json.starts_with(ERROR_PREFIX));
        assert!(bad_json.contains("parse"));

        let tool_error = registry.execute_text("echo", "{}").await;
        assert!(tool_error.starts_with(ERROR_PREFIX));
        assert!(tool_error.contains("echo"));

        let not_object = registry.execute_text("echo", "[1, 2]").await;
        assert!(not_object.starts_with(ERROR_PREFIX));
    }

    #[tokio::test]
    async fn empty_arguments_default_to_object() {
        let out = registry().execute_text("upper", "").await;
        assert_eq!(out, "");
    }
}
