//! `troupe pipeline`: researcher → analyst → writer.

use std::path::Path;
use troupe_agent::{Pipeline, PipelineStep, Strategy};

use super::setup;

pub async fn run(config_path: Option<&Path>, task: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = setup::load_config(config_path)?;
    let provider = setup::provider(&config)?;
    let roles = setup::roles(&config);

    let mut pipeline = Pipeline::with_coordinator(setup::coordinator(&config, provider));
    for name in ["researcher", "analyst", "writer"] {
        pipeline.coordinator_mut().add_agent(roles.get(name)?)?;
    }
    for step in steps() {
        pipeline.add_step(step);
    }

    let result = pipeline.run(task).await?;
    setup::print_answer("Report", &result);
    println!("  {}", pipeline.coordinator().state().summary());
    Ok(())
}

fn steps() -> Vec<PipelineStep> {
    vec![
        PipelineStep::new("researcher").with_template(
            "Research the following topic and organize the key information:\n{task}\n\n\
             Search for relevant material and extract 3-5 key points.",
        ),
        PipelineStep::new("analyst").with_template(
            "Here is what the researcher collected. Analyze it in depth:\n\n\
             {prev_result}\n\n\
             Original topic: {task}\n\n\
             Identify trends, strengths, weaknesses, and what it means.",
        ),
        PipelineStep::new("writer").with_template(
            "Write a short analytical report from the research and analysis below:\n\n\
             [Research and analysis]\n{all_results}\n\n\
             Original topic: {task}\n\n\
             Use headings and keep it under 500 words.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_chain_the_three_roles() {
        let steps = steps();
        let agents: Vec<_> = steps.iter().map(|s| s.agent_name.as_str()).collect();
        assert_eq!(agents, ["researcher", "analyst", "writer"]);

        let rendered = steps[1].render("Rust", "facts", "all");
        assert!(rendered.contains("facts\n\nOriginal topic: Rust"));
    }
}
