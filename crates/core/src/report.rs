//! Reporting: flatten per-node matches into records for downstream consumers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matcher::MatchStats;
use crate::rules::RuleTable;
use crate::tree::{NamespaceTree, Visit};
use crate::untagged::UntaggedCandidate;

/// One library attributed to one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryHit {
    /// Namespace path in the analyzed binary (possibly obfuscated).
    pub path: String,
    pub library: String,
    pub canonical_path: String,
    pub category: String,
    pub website: String,
    pub matched_weight: u64,
    /// Weight of the namespace the library was attributed to.
    pub total_weight: u64,
}

impl LibraryHit {
    /// Fraction of the namespace's members accounted for by the library.
    pub fn similarity(&self) -> f64 {
        if self.total_weight == 0 {
            0.0
        } else {
            self.matched_weight as f64 / self.total_weight as f64
        }
    }
}

/// Counters describing one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    pub entries: usize,
    pub nodes: usize,
    pub hashed: usize,
    pub matching: MatchStats,
    pub generated_at: String,
}

/// Everything one analysis produces.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub libraries: Vec<LibraryHit>,
    pub untagged: Vec<UntaggedCandidate>,
    pub stats: AnalysisStats,
}

/// Emit every recorded match in pre-order.
pub fn collect_library_hits(tree: &NamespaceTree, rules: &RuleTable) -> Vec<LibraryHit> {
    let mut hits = Vec::new();
    tree.pre_order(|tree, id| {
        let node = tree.node(id);
        for m in node.matches() {
            let Some(lib) = rules.get(m.rule) else {
                continue;
            };
            hits.push(LibraryHit {
                path: node.path().to_string(),
                library: lib.label.clone(),
                canonical_path: lib.canonical_path.clone(),
                category: lib.category.clone(),
                website: lib.website.clone(),
                matched_weight: m.weight,
                total_weight: node.weight(),
            });
        }
        Visit::Descend
    });
    hits
}

/// Human-readable listing of a report.
pub fn render_text(report: &AnalysisReport) -> String {
    report.to_string()
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== LIBRARIES ({}) =====", self.libraries.len())?;
        if self.libraries.is_empty() {
            writeln!(f, "(none)")?;
        }
        for hit in &self.libraries {
            writeln!(f, "----")?;
            writeln!(f, "Package: {}", hit.path)?;
            writeln!(f, "Library: {}", hit.library)?;
            writeln!(f, "Standard Package: {}", hit.canonical_path)?;
            writeln!(f, "Type: {}", hit.category)?;
            writeln!(f, "Website: {}", hit.website)?;
            writeln!(f, "Similarity: {}/{}", hit.matched_weight, hit.total_weight)?;
        }

        writeln!(f, "===== UNKNOWN POPULAR PACKAGES ({}) =====", self.untagged.len())?;
        if self.untagged.is_empty() {
            writeln!(f, "(none)")?;
        }
        for item in &self.untagged {
            writeln!(f, "----")?;
            writeln!(f, "Package: {}", item.path)?;
            writeln!(f, "Match Package: {}", item.candidate)?;
            writeln!(f, "Library: Unknown.")?;
            writeln!(f, "Popularity: {}/{}", item.match_count, item.global_count)?;
            writeln!(f, "API count: {}", item.weight)?;
        }
        Ok(())
    }
}
