//! Wiring shared by the agent commands.

use std::path::Path;
use std::sync::Arc;
use troupe_agent::multi::coordinator::AgentDefaults;
use troupe_agent::{Coordinator, HookEvent, HookKind, RoleCatalog};
use troupe_config::AppConfig;
use troupe_core::provider::Provider;
use troupe_providers::OpenAiCompatProvider;

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(config)
}

pub fn provider(config: &AppConfig) -> Result<Arc<dyn Provider>, Box<dyn std::error::Error>> {
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    TROUPE_API_KEY=sk-...");
        eprintln!("    OPENAI_API_KEY=sk-...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }
    let provider = OpenAiCompatProvider::from_config(config)?;
    Ok(Arc::new(provider))
}

pub fn roles(config: &AppConfig) -> RoleCatalog {
    RoleCatalog::with_configured(&config.roles)
}

/// A coordinator over the default tools, with agent settings from config
/// and hooks that log agent activity.
pub fn coordinator(config: &AppConfig, provider: Arc<dyn Provider>) -> Coordinator {
    let mut coordinator = Coordinator::new(
        provider,
        config.model.clone(),
        troupe_tools::default_registry(),
    )
    .with_defaults(agent_defaults(config));
    log_activity(&mut coordinator);
    coordinator
}

pub fn agent_defaults(config: &AppConfig) -> AgentDefaults {
    AgentDefaults {
        mode: config.agent.mode.clone(),
        max_steps: config.agent.max_steps,
        history_turns: config.agent.history_turns,
        temperature: config.temperature,
        max_tokens: Some(config.max_tokens),
    }
}

fn log_activity(coordinator: &mut Coordinator) {
    coordinator.on(HookKind::AgentStart, |event| {
        if let HookEvent::AgentStart { agent, .. } = event {
            tracing::info!(agent, "▶ agent started");
        }
    });
    coordinator.on(HookKind::AgentFinish, |event| {
        if let HookEvent::AgentFinish { agent, result } = event {
            tracing::info!(agent, chars = result.chars().count(), "✔ agent finished");
        }
    });
    coordinator.on(HookKind::Error, |event| {
        if let HookEvent::Error { agent, error } = event {
            tracing::warn!(agent, error, "✘ agent error");
        }
    });
}

pub fn print_answer(title: &str, answer: &str) {
    println!();
    println!("{title}");
    println!("{}", "=".repeat(title.chars().count()));
    println!("{answer}");
    println!();
}
