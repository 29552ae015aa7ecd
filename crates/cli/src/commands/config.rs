use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use namescope_core::config::AnalysisConfig;

/// Write the default analysis configuration as pretty JSON.
pub fn init_config_command(path: &str, force: bool) -> Result<()> {
    let target = Path::new(path);
    if target.exists() && !force {
        return Err(anyhow!(
            "Config already exists at {}; pass --force to overwrite",
            target.display()
        ));
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(&AnalysisConfig::default())?;
    fs::write(target, json)
        .with_context(|| format!("Failed to write config: {}", target.display()))?;

    println!("Wrote default config to {}", target.display());
    Ok(())
}
