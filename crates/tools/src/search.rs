//! Search tool: returns canned results for a handful of topics.
//!
//! There is no network access behind it. Known topics map to fixed
//! result lists; anything else gets two generic entries, so agents can be
//! exercised end-to-end offline.

use async_trait::async_trait;
use serde::Serialize;
use troupe_core::error::ToolError;
use troupe_core::tool::{Tool, ToolResult};

pub struct SearchTool;

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the internet for information. Use it for recent news, factual \
         knowledge, or anything you are unsure about."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search keywords"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let hits = lookup(query);
        let mut lines = vec![format!("Results for '{query}':")];
        for (i, hit) in hits.iter().enumerate() {
            lines.push(format!("  {}. [{}]({})", i + 1, hit.title, hit.url));
            lines.push(format!("     {}", hit.snippet));
        }

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: lines.join("\n"),
            data: serde_json::to_value(&hits).ok(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct SearchHit {
    title: String,
    url: String,
    snippet: String,
}

impl SearchHit {
    fn new(title: &str, url: &str, snippet: &str) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// First topic whose keyword occurs in the lowercased query wins.
fn lookup(query: &str) -> Vec<SearchHit> {
    let q = query.to_lowercase();

    if q.contains("rust") {
        return vec![
            SearchHit::new(
                "The Rust Programming Language",
                "https://doc.rust-lang.org/book/",
                "Rust is a systems programming language focused on safety, speed, and concurrency.",
            ),
            SearchHit::new(
                "Rust by Example",
                "https://doc.rust-lang.org/rust-by-example/",
                "A collection of runnable examples that illustrate Rust concepts.",
            ),
        ];
    }
    if q.contains("python") {
        return vec![
            SearchHit::new(
                "Python documentation",
                "https://docs.python.org",
                "Python is an interpreted, high-level, general-purpose programming language.",
            ),
            SearchHit::new(
                "The Python Tutorial",
                "https://docs.python.org/3/tutorial/",
                "An informal introduction to the language, from basics to classes.",
            ),
        ];
    }
    if q.contains("react agent") {
        return vec![
            SearchHit::new(
                "ReAct: Synergizing Reasoning and Acting in Language Models",
                "https://arxiv.org/abs/2210.03629",
                "Interleaves reasoning traces with task-specific actions.",
            ),
            SearchHit::new(
                "Building a ReAct Agent from Scratch",
                "https://example.com/react-agent",
                "A step-by-step walkthrough of a minimal ReAct loop.",
            ),
        ];
    }
    if q.contains("llm") || q.contains("language model") {
        return vec![
            SearchHit::new(
                "What is a large language model?",
                "https://example.com/llm-intro",
                "Large language models are transformer networks pre-trained on vast text corpora.",
            ),
            SearchHit::new(
                "Building applications with LLMs",
                "https://example.com/llm-dev",
                "How to design tools, prompts, and agents around language models.",
            ),
        ];
    }

    vec![
        SearchHit::new(
            "Related article",
            &format!("https://example.com/search?q={}", query.replace(' ', "+")),
            &format!("Some information about '{query}'."),
        ),
        SearchHit::new(
            "Encyclopedia",
            &format!("https://example.com/wiki/{}", query.replace(' ', "_")),
            &format!("An encyclopedia entry on '{query}'."),
        ),
    ]
}
