//! Library rule table.
//!
//! Each rule names a library by its canonical namespace path. Rules labelled
//! `no` mark packages that are known *not* to be libraries; they are kept apart
//! from the labelled libraries and only consulted by the untagged pass.

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Label that marks an explicitly excluded (non-library) package.
pub const EXCLUSION_LABEL: &str = "no";

/// Error type for loading rule tables.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Failed to read rule file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported rule file format '{0}'; expected csv, json, yaml or yml")]
    UnsupportedFormat(String),

    #[error("Malformed rule on line {line}: expected 4 columns, found {found}")]
    MalformedRow { line: u64, found: usize },
}

/// Convenience result type for rule loading.
pub type RuleResult<T> = Result<T, RuleError>;

/// One row of the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibraryRecord {
    /// Root namespace of the library (e.g. `Lcom/google/gson`).
    pub canonical_path: String,
    /// Library name, or `no` for excluded packages.
    pub label: String,
    /// Category such as "Development Aid" or "Advertisement".
    pub category: String,
    pub website: String,
}

impl LibraryRecord {
    pub fn new(
        canonical_path: impl Into<String>,
        label: impl Into<String>,
        category: impl Into<String>,
        website: impl Into<String>,
    ) -> Self {
        Self {
            canonical_path: canonical_path.into(),
            label: label.into(),
            category: category.into(),
            website: website.into(),
        }
    }

    pub fn is_exclusion(&self) -> bool {
        self.label == EXCLUSION_LABEL
    }
}

/// Index of a labelled library inside its [`RuleTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(usize);

impl RuleId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Read-only rule table, partitioned into labelled libraries and exclusions.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    labeled_libs: Vec<LibraryRecord>,
    no_lib: Vec<LibraryRecord>,
    excluded_paths: HashSet<String>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from records, partitioning on the exclusion label.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = LibraryRecord>,
    {
        let mut table = Self::new();
        for record in records {
            table.push(record);
        }
        table
    }

    pub fn push(&mut self, record: LibraryRecord) {
        if record.is_exclusion() {
            self.excluded_paths.insert(record.canonical_path.clone());
            self.no_lib.push(record);
        } else {
            self.labeled_libs.push(record);
        }
    }

    /// Load a rule file, choosing the parser by extension.
    ///
    /// `.csv`/`.txt` files are headerless rows of
    /// `canonical_path,label,category,website` quoted with `|`; `.json`, `.yaml`
    /// and `.yml` files hold an array of records.
    pub fn load(path: &Path) -> RuleResult<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_lowercase();
        let read = |path: &Path| {
            fs::read_to_string(path)
                .map_err(|source| RuleError::Io { path: path.to_path_buf(), source })
        };
        let table = match ext.as_str() {
            "csv" | "txt" => {
                let file = fs::File::open(path)
                    .map_err(|source| RuleError::Io { path: path.to_path_buf(), source })?;
                Self::from_csv_reader(file)?
            }
            "json" => Self::from_records(serde_json::from_str::<Vec<LibraryRecord>>(&read(path)?)?),
            "yaml" | "yml" => {
                Self::from_records(serde_yaml::from_str::<Vec<LibraryRecord>>(&read(path)?)?)
            }
            other => return Err(RuleError::UnsupportedFormat(other.to_string())),
        };
        debug!(
            path = %path.display(),
            libraries = table.labeled_len(),
            exclusions = table.exclusions().len(),
            "loaded rule table"
        );
        Ok(table)
    }

    /// Parse the headerless `|`-quoted CSV rule format. Lines starting with `#` are ignored.
    pub fn from_csv_reader<R: Read>(reader: R) -> RuleResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b',')
            .quote(b'|')
            .comment(Some(b'#'))
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut table = Self::new();
        for row in csv_reader.records() {
            let row = row?;
            if row.len() < 4 {
                let line = row.position().map(|p| p.line()).unwrap_or_default();
                return Err(RuleError::MalformedRow { line, found: row.len() });
            }
            table.push(LibraryRecord::new(&row[0], &row[1], &row[2], &row[3]));
        }
        Ok(table)
    }

    /// Labelled libraries in table order.
    pub fn labeled(&self) -> impl Iterator<Item = (RuleId, &LibraryRecord)> {
        self.labeled_libs.iter().enumerate().map(|(idx, record)| (RuleId(idx), record))
    }

    pub fn get(&self, id: RuleId) -> Option<&LibraryRecord> {
        self.labeled_libs.get(id.0)
    }

    pub fn labeled_len(&self) -> usize {
        self.labeled_libs.len()
    }

    pub fn exclusions(&self) -> &[LibraryRecord] {
        &self.no_lib
    }

    /// Whether `path` is registered as a known non-library package.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.labeled_libs.is_empty() && self.no_lib.is_empty()
    }
}
