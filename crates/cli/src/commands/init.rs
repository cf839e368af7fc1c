//! `troupe init`: Write a starter config file.

use std::path::Path;
use troupe_config::AppConfig;

pub fn run(config_path: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default_path = AppConfig::config_path();
    let path = config_path.unwrap_or(default_path.as_path());

    if write_starter(path, force)? {
        println!("✅ Created config at: {}", path.display());
        println!("\n📝 Next steps:");
        println!("   1. Edit {} and add your API key", path.display());
        println!("   2. Run: troupe ask \"What is 2 ** 10?\"\n");
    } else {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or re-run with --force.\n");
    }
    Ok(())
}

/// Write the default config to `path`. Returns false if a file exists and
/// `force` is off.
fn write_starter(path: &Path, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_loadable_config_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(write_starter(&path, false).unwrap());
        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.validate().is_ok());

        std::fs::write(&path, "model = \"custom\"\n").unwrap();
        assert!(!write_starter(&path, false).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "model = \"custom\"\n");

        assert!(write_starter(&path, true).unwrap());
        assert_ne!(std::fs::read_to_string(&path).unwrap(), "model = \"custom\"\n");
    }
}
