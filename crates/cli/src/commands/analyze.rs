use std::path::Path;

use anyhow::{Context, Result};
use namescope_core::analysis::Analyzer;
use namescope_core::db::open_fingerprint_db;
use namescope_core::input::load_entries;
use namescope_core::report::{render_text, AnalysisReport};
use tracing::info;

use crate::commands::{load_analysis_config, load_rules, print_json, resolve_source};

/// Sources and overrides for one `analyze` invocation.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub input: String,
    pub rules: Option<String>,
    pub db: Option<String>,
    pub config: Option<String>,
    pub separator: Option<char>,
}

/// Load everything, run the pipeline, and return the report.
pub fn run_analysis(options: &AnalyzeOptions) -> Result<AnalysisReport> {
    let mut config = load_analysis_config(options.config.as_deref())?;
    if let Some(separator) = options.separator {
        config.separator = separator;
        config.validate()?;
    }

    let rules_path = resolve_source(
        options.rules.as_deref(),
        config.rules.as_ref(),
        "rule table",
        "--rules",
        "rules",
    )?;
    let db_path = resolve_source(
        options.db.as_deref(),
        config.fingerprint_db.as_ref(),
        "fingerprint database",
        "--db",
        "fingerprint_db",
    )?;

    let rules = load_rules(&rules_path)?;
    let db = open_fingerprint_db(&db_path)?;
    let input_path = Path::new(&options.input);
    let entries = load_entries(input_path)
        .with_context(|| format!("Failed to load namespaces from {}", input_path.display()))?;
    info!(entries = entries.len(), rules = %rules_path.display(), db = %db_path.display(), "starting analysis");

    Analyzer::new(&config, &rules, &db)
        .analyze(entries)
        .with_context(|| format!("Analysis of {} failed", input_path.display()))
}

/// Run the pipeline and print the report as text or JSON.
pub fn analyze_command(options: &AnalyzeOptions, json: bool) -> Result<()> {
    let report = run_analysis(options)?;
    if json {
        return print_json(&report);
    }
    print!("{}", render_text(&report));
    println!(
        "Scanned {} namespaces ({} nodes); {} libraries, {} unknown popular packages.",
        report.stats.entries,
        report.stats.nodes,
        report.libraries.len(),
        report.untagged.len()
    );
    Ok(())
}
