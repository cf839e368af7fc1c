//! `troupe roles`: List available roles.

use std::path::Path;

use super::setup;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = setup::load_config(config_path)?;
    let catalog = setup::roles(&config);

    println!("Roles");
    println!("=====");
    for role in catalog.iter() {
        let tools = if role.tools.is_empty() {
            "-".to_string()
        } else {
            role.tools.join(", ")
        };
        println!("  {:<14} {}", role.name, role.description);
        println!("  {:<14} tools: {tools}", "");
    }
    Ok(())
}
