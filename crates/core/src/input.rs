//! Extractor output: one `(path, weight, fingerprint)` triple per namespace.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fingerprint::Fingerprint;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read namespace listing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported namespace listing format '{0}'; expected json or csv")]
    UnsupportedFormat(String),

    #[error("Malformed namespace entry on line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
}

pub type InputResult<T> = Result<T, InputError>;

/// A namespace observed in the binary, as reported by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    pub path: String,
    /// Number of members (methods, functions) declared directly under `path`.
    pub weight: u64,
    pub fingerprint: Fingerprint,
}

impl NamespaceEntry {
    pub fn new(path: impl Into<String>, weight: u64, fingerprint: Fingerprint) -> Self {
        Self { path: path.into(), weight, fingerprint }
    }
}

/// Load extractor output: a JSON array of entries, or headerless `path,weight,hex` CSV.
pub fn load_entries(path: &Path) -> InputResult<Vec<NamespaceEntry>> {
    let io_err = |source| InputError::Io { path: path.to_path_buf(), source };
    match path.extension().and_then(|e| e.to_str()).unwrap_or_default() {
        "json" => {
            let body = fs::read_to_string(path).map_err(io_err)?;
            Ok(serde_json::from_str(&body)?)
        }
        "csv" => entries_from_csv(fs::File::open(path).map_err(io_err)?),
        other => Err(InputError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse headerless `path,weight,fingerprint-hex` rows.
pub fn entries_from_csv<R: Read>(reader: R) -> InputResult<Vec<NamespaceEntry>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let malformed = |reason: String| InputError::MalformedRow { line, reason };
        if row.len() != 3 {
            return Err(malformed(format!("expected 3 columns, found {}", row.len())));
        }
        let weight: u64 =
            row[1].parse().map_err(|e| malformed(format!("bad weight '{}': {e}", &row[1])))?;
        let fingerprint =
            Fingerprint::from_hex(&row[2]).map_err(|e| malformed(e.to_string()))?;
        out.push(NamespaceEntry::new(&row[0], weight, fingerprint));
    }
    Ok(out)
}
