//! `troupe ask`: One ReAct agent, default tools.

use std::path::Path;
use troupe_agent::ReactAgent;

use super::setup;

pub async fn run(
    config_path: Option<&Path>,
    query: &str,
    mode: Option<String>,
    max_steps: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = setup::load_config(config_path)?;
    let provider = setup::provider(&config)?;

    let mode = mode.unwrap_or_else(|| config.agent.mode.clone());
    let mut agent = ReactAgent::new(provider, config.model.clone(), troupe_tools::default_registry())
        .with_mode_name(&mode)?
        .with_max_steps(max_steps.unwrap_or(config.agent.max_steps))
        .with_history_turns(config.agent.history_turns)
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens);

    let result = agent.run(query).await?;

    setup::print_answer("Answer", &result.answer);
    println!(
        "  steps: {}/{}  tool calls: {}{}",
        result.steps,
        agent.max_steps(),
        result.tool_calls_made,
        if result.exhausted { "  (step limit reached)" } else { "" }
    );
    Ok(())
}
