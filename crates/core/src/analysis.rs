//! Analysis pipeline: build, hash, match, find untagged, report.
//!
//! Each run owns its own [`NamespaceTree`]; the rule table and the lookup are
//! shared read-only, so one [`Analyzer`] can serve many binaries.

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::fingerprint::compute_structural_hashes;
use crate::input::NamespaceEntry;
use crate::lookup::FingerprintLookup;
use crate::matcher::{LibraryMatcher, MatchError};
use crate::report::{collect_library_hits, AnalysisReport, AnalysisStats};
use crate::rules::RuleTable;
use crate::tree::{NamespaceTree, TreeError};
use crate::untagged::UntaggedReporter;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid namespace entry: {0}")]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Match(#[from] MatchError),
}

/// Ties configuration, rules and lookup together for one or more runs.
pub struct Analyzer<'a> {
    pub config: &'a AnalysisConfig,
    pub rules: &'a RuleTable,
    pub lookup: &'a dyn FingerprintLookup,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        config: &'a AnalysisConfig,
        rules: &'a RuleTable,
        lookup: &'a dyn FingerprintLookup,
    ) -> Self {
        Self { config, rules, lookup }
    }

    /// Insert every entry into a fresh tree.
    pub fn build_tree<I>(&self, entries: I) -> Result<NamespaceTree, TreeError>
    where
        I: IntoIterator<Item = NamespaceEntry>,
    {
        let mut tree = NamespaceTree::with_separator(self.config.separator);
        for entry in entries {
            tree.insert(&entry.path, entry.weight, entry.fingerprint)?;
        }
        Ok(tree)
    }

    /// Run the full pipeline over extractor output.
    pub fn analyze<I>(&self, entries: I) -> Result<AnalysisReport, AnalysisError>
    where
        I: IntoIterator<Item = NamespaceEntry>,
    {
        let entries: Vec<NamespaceEntry> = entries.into_iter().collect();
        let count = entries.len();
        let mut tree = self.build_tree(entries)?;
        info!(entries = count, nodes = tree.len(), "namespace tree built");

        let mut report = self.analyze_tree(&mut tree)?;
        report.stats.entries = count;
        Ok(report)
    }

    /// Hash, match and report an already populated tree.
    pub fn analyze_tree(&self, tree: &mut NamespaceTree) -> Result<AnalysisReport, AnalysisError> {
        let hashed = compute_structural_hashes(tree);

        let matcher = LibraryMatcher::new(self.rules, self.lookup, &self.config.matcher);
        let matching = matcher.run(tree)?;
        let libraries = collect_library_hits(tree, self.rules);
        info!(
            visited = matching.visited,
            libraries = libraries.len(),
            root_errors = matching.root_errors,
            "library matching finished"
        );

        let reporter = UntaggedReporter::new(self.rules, self.lookup, &self.config.untagged);
        let untagged = reporter.run(tree)?;
        info!(untagged = untagged.len(), "untagged scan finished");

        Ok(AnalysisReport {
            libraries,
            untagged,
            stats: AnalysisStats {
                entries: 0,
                nodes: tree.len(),
                hashed,
                matching,
                generated_at: Utc::now().to_rfc3339(),
            },
        })
    }
}
