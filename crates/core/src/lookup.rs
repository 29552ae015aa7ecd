//! Fingerprint lookup: what the reference corpus knows about a fingerprint.
//!
//! The store behind the lookup is external. Implementations must be safe to
//! share read-only across concurrent analyses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;

/// Everything the corpus knows about one fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintEntry {
    /// Namespace path this fingerprint was most often seen under, unobfuscated.
    pub candidate: String,
    /// How many times the fingerprint was observed across the corpus.
    pub global_count: u64,
    /// How many of those observations carried `candidate` as the real name.
    pub match_count: u64,
}

impl FingerprintEntry {
    pub fn new(candidate: impl Into<String>, global_count: u64, match_count: u64) -> Self {
        Self { candidate: candidate.into(), global_count, match_count }
    }

    /// `match_count / global_count`, or `None` when the population is zero.
    pub fn match_ratio(&self) -> Option<f64> {
        if self.global_count == 0 {
            None
        } else {
            Some(self.match_count as f64 / self.global_count as f64)
        }
    }
}

/// Read-only view of a fingerprint database.
pub trait FingerprintLookup: Send + Sync {
    fn candidate_name(&self, fingerprint: &Fingerprint) -> Option<String>;
    fn global_count(&self, fingerprint: &Fingerprint) -> Option<u64>;
    fn match_count(&self, fingerprint: &Fingerprint) -> Option<u64>;

    /// All three facts at once; `None` if any of them is unknown.
    ///
    /// Stores that can answer in a single query should override this.
    fn entry(&self, fingerprint: &Fingerprint) -> Option<FingerprintEntry> {
        Some(FingerprintEntry {
            candidate: self.candidate_name(fingerprint)?,
            global_count: self.global_count(fingerprint)?,
            match_count: self.match_count(fingerprint)?,
        })
    }
}

/// HashMap-backed lookup for tests and small embedded tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLookup {
    entries: HashMap<Fingerprint, FingerprintEntry>,
}

impl InMemoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fingerprint: Fingerprint, entry: FingerprintEntry) -> &mut Self {
        self.entries.insert(fingerprint, entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Fingerprint, FingerprintEntry)> for InMemoryLookup {
    fn from_iter<T: IntoIterator<Item = (Fingerprint, FingerprintEntry)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl FingerprintLookup for InMemoryLookup {
    fn candidate_name(&self, fingerprint: &Fingerprint) -> Option<String> {
        self.entries.get(fingerprint).map(|e| e.candidate.clone())
    }

    fn global_count(&self, fingerprint: &Fingerprint) -> Option<u64> {
        self.entries.get(fingerprint).map(|e| e.global_count)
    }

    fn match_count(&self, fingerprint: &Fingerprint) -> Option<u64> {
        self.entries.get(fingerprint).map(|e| e.match_count)
    }

    fn entry(&self, fingerprint: &Fingerprint) -> Option<FingerprintEntry> {
        self.entries.get(fingerprint).cloned()
    }
}
