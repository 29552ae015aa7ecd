use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use namescope_core::config::{load_config, AnalysisConfig};
use namescope_core::rules::RuleTable;
use serde::Serialize;

/// Load the config file if one was given, otherwise the defaults.
pub fn load_analysis_config(path: Option<&str>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => load_config(Path::new(p)),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Pick the CLI flag over the config value; error out naming both when neither is set.
pub fn resolve_source(
    flag: Option<&str>,
    configured: Option<&PathBuf>,
    what: &str,
    flag_name: &str,
    config_key: &str,
) -> Result<PathBuf> {
    flag.map(PathBuf::from).or_else(|| configured.cloned()).ok_or_else(|| {
        anyhow!("No {what} given; pass {flag_name} or set `{config_key}` in the config file")
    })
}

/// Load a rule table with a readable error.
pub fn load_rules(path: &Path) -> Result<RuleTable> {
    RuleTable::load(path).with_context(|| format!("Failed to load rule table {}", path.display()))
}

/// Pretty-print any serializable value as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    println!("{}", serialized);
    Ok(())
}
