use anyhow::Result;
use clap::{Parser, Subcommand};
use namescope::{
    analyze_command, init_config_command, init_tracing, list_rules_command, lookup_command,
    AnalyzeOptions,
};

/// Detect third-party libraries in a compiled application from its namespace tree.
///
/// This CLI is a thin wrapper around `namescope-core` (exposed in code as
/// `namescope_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "namescope",
    version,
    about = "Namespace-structure library detection",
    long_about = None
)]
struct Cli {
    /// Log debug details to stderr (RUST_LOG overrides).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Match an extracted namespace listing against the rule table and fingerprint database.
    ///
    /// The listing is a JSON array of `{path, weight, fingerprint}` objects or a
    /// headerless `path,weight,fingerprint` CSV file produced by an extractor.
    Analyze {
        /// Namespace listing to analyze (.json or .csv).
        #[arg(long)]
        input: String,

        /// Rule table (.csv, .json, .yaml). Overrides `rules` in the config.
        #[arg(long)]
        rules: Option<String>,

        /// Fingerprint database (SQLite). Overrides `fingerprint_db` in the config.
        #[arg(long)]
        db: Option<String>,

        /// Optional config file (.json, .yaml).
        #[arg(long)]
        config: Option<String>,

        /// Namespace separator. Overrides `separator` in the config.
        #[arg(long)]
        separator: Option<char>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the libraries and exclusions in a rule table.
    ListRules {
        /// Rule table (.csv, .json, .yaml).
        #[arg(long)]
        rules: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show what the fingerprint database knows about one fingerprint.
    Lookup {
        /// Fingerprint database (SQLite).
        #[arg(long)]
        db: String,

        /// Hex-encoded fingerprint.
        #[arg(long)]
        fingerprint: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Write a config file holding the default thresholds.
    InitConfig {
        /// Where to write the config.
        #[arg(long, default_value = "namescope.json")]
        path: String,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Analyze { input, rules, db, config, separator, json } => {
            let options = AnalyzeOptions { input, rules, db, config, separator };
            analyze_command(&options, json)?
        }
        Command::ListRules { rules, json } => list_rules_command(&rules, json)?,
        Command::Lookup { db, fingerprint, json } => lookup_command(&db, &fingerprint, json)?,
        Command::InitConfig { path, force } => init_config_command(&path, force)?,
    }

    Ok(())
}
