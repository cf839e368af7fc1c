//! `troupe orchestrate`: planner-driven collaboration.

use std::path::Path;
use troupe_agent::{Orchestrator, Strategy};

use super::setup;

pub async fn run(
    config_path: Option<&Path>,
    task: &str,
    max_replan: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = setup::load_config(config_path)?;
    let provider = setup::provider(&config)?;
    let roles = setup::roles(&config);

    let mut orchestrator = Orchestrator::with_coordinator(setup::coordinator(&config, provider))
        .with_max_replan(max_replan.unwrap_or(config.orchestrator.max_replan));
    for name in ["researcher", "analyst", "writer"] {
        orchestrator.coordinator_mut().add_agent(roles.get(name)?)?;
    }

    let answer = orchestrator.run(task).await?;

    let state = orchestrator.coordinator().state();
    if !state.plan.is_empty() {
        println!("\nPlan:");
        for (i, step) in state.plan.iter().enumerate() {
            println!("  {}. {step}", i + 1);
        }
    }
    setup::print_answer("Answer", &answer);
    println!("  {}", state.summary());
    Ok(())
}
