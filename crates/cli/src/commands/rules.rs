use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use namescope_core::rules::LibraryRecord;

use crate::commands::{load_rules, print_json};

#[derive(Debug, Serialize)]
pub struct RuleListing<'a> {
    pub libraries: Vec<&'a LibraryRecord>,
    pub exclusions: &'a [LibraryRecord],
}

/// List the labelled libraries and exclusions in a rule table.
pub fn list_rules_command(rules: &str, json: bool) -> Result<()> {
    let table = load_rules(Path::new(rules))?;
    let listing = RuleListing {
        libraries: table.labeled().map(|(_, record)| record).collect(),
        exclusions: table.exclusions(),
    };

    if json {
        return print_json(&listing);
    }

    println!("Libraries ({}):", listing.libraries.len());
    if listing.libraries.is_empty() {
        println!("  (none)");
    }
    for lib in &listing.libraries {
        let category = if lib.category.is_empty() { "-" } else { lib.category.as_str() };
        println!("  - {} [{}] {} {}", lib.label, category, lib.canonical_path, lib.website);
    }

    println!("Exclusions ({}):", listing.exclusions.len());
    if listing.exclusions.is_empty() {
        println!("  (none)");
    }
    for excluded in listing.exclusions {
        println!("  - {}", excluded.canonical_path);
    }

    Ok(())
}
