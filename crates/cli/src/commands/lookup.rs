use std::path::Path;

use anyhow::{Context, Result};
use namescope_core::db::open_fingerprint_db;
use namescope_core::fingerprint::Fingerprint;
use namescope_core::lookup::{FingerprintEntry, FingerprintLookup};
use serde::Serialize;

use crate::commands::print_json;

#[derive(Debug, Serialize)]
pub struct LookupResult {
    pub fingerprint: Fingerprint,
    pub entry: Option<FingerprintEntry>,
    pub match_ratio: Option<f64>,
}

/// Look up one fingerprint in a store.
pub fn lookup_fingerprint(db: &str, fingerprint: &str) -> Result<LookupResult> {
    let fingerprint: Fingerprint =
        fingerprint.parse().with_context(|| format!("Invalid fingerprint '{fingerprint}'"))?;
    let db = open_fingerprint_db(Path::new(db))?;
    let entry = db.entry(&fingerprint);
    let match_ratio = entry.as_ref().and_then(FingerprintEntry::match_ratio);
    Ok(LookupResult { fingerprint, entry, match_ratio })
}

/// Show the store's view of one fingerprint.
pub fn lookup_command(db: &str, fingerprint: &str, json: bool) -> Result<()> {
    let result = lookup_fingerprint(db, fingerprint)?;
    if json {
        return print_json(&result);
    }

    println!("Fingerprint: {}", result.fingerprint);
    match &result.entry {
        Some(entry) => {
            println!("Candidate: {}", entry.candidate);
            println!("Popularity: {}", entry.global_count);
            println!("Confirmed: {}", entry.match_count);
            match result.match_ratio {
                Some(ratio) => println!("Ratio: {:.3}", ratio),
                None => println!("Ratio: (undefined, zero popularity)"),
            }
        }
        None => println!("Candidate: (unknown)"),
    }
    Ok(())
}
