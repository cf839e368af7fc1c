//! `troupe debate`: python_expert vs go_expert, judged by reviewer.

use std::path::Path;
use troupe_agent::{Debate, Strategy};

use super::setup;

pub async fn run(
    config_path: Option<&Path>,
    topic: &str,
    rounds: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = setup::load_config(config_path)?;
    let provider = setup::provider(&config)?;
    let roles = setup::roles(&config);

    let mut debate = Debate::with_coordinator(setup::coordinator(&config, provider))
        .with_max_rounds(rounds.unwrap_or(config.debate.max_rounds));
    debate.add_debater(roles.get("python_expert")?)?;
    debate.add_debater(roles.get("go_expert")?)?;
    debate.set_judge(roles.get("reviewer")?)?;

    let verdict = debate.run(topic).await?;

    for (i, round) in debate.rounds().iter().enumerate() {
        println!("\n--- Round {} ---", i + 1);
        for (name, opinion) in round {
            println!("\n[{name}]\n{opinion}");
        }
    }
    setup::print_answer("Verdict", &verdict);
    Ok(())
}
