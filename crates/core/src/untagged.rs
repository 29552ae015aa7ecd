//! Untagged reporter: popular namespaces that no rule labels.
//!
//! Runs after the matcher and only looks at subtrees the matcher left
//! unclassified. A namespace is reported when the corpus has confirmed its
//! candidate name often enough and it is large enough to matter.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::UntaggedThresholds;
use crate::lookup::FingerprintLookup;
use crate::matcher::{with_ratio, MatchError};
use crate::rules::RuleTable;
use crate::tree::{NamespaceTree, NodeId, Visit};

/// Classification of one node by the untagged pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UntaggedOutcome {
    /// The matcher already attributed a library here; the subtree is skipped.
    AlreadyMatched,
    NoCandidate,
    /// The candidate is a registered non-library package.
    Excluded,
    BelowThreshold,
    Reported,
}

impl UntaggedOutcome {
    pub fn visit(self) -> Visit {
        match self {
            UntaggedOutcome::AlreadyMatched | UntaggedOutcome::Reported => Visit::Prune,
            _ => Visit::Descend,
        }
    }
}

/// A popular namespace without a library label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntaggedCandidate {
    pub path: String,
    pub candidate: String,
    pub match_count: u64,
    pub global_count: u64,
    pub weight: u64,
}

pub struct UntaggedReporter<'a> {
    rules: &'a RuleTable,
    lookup: &'a dyn FingerprintLookup,
    thresholds: &'a UntaggedThresholds,
}

impl<'a> UntaggedReporter<'a> {
    pub fn new(
        rules: &'a RuleTable,
        lookup: &'a dyn FingerprintLookup,
        thresholds: &'a UntaggedThresholds,
    ) -> Self {
        Self { rules, lookup, thresholds }
    }

    /// Walk the tree in pre-order and collect every reported namespace.
    pub fn run(&self, tree: &NamespaceTree) -> Result<Vec<UntaggedCandidate>, MatchError> {
        let mut found = Vec::new();
        tree.try_pre_order(|tree, id| {
            let (outcome, candidate) = self.classify(tree, id)?;
            found.extend(candidate);
            Ok(outcome.visit())
        })?;
        Ok(found)
    }

    pub fn classify(
        &self,
        tree: &NamespaceTree,
        id: NodeId,
    ) -> Result<(UntaggedOutcome, Option<UntaggedCandidate>), MatchError> {
        let node = tree.node(id);
        if !node.matches().is_empty() {
            return Ok((UntaggedOutcome::AlreadyMatched, None));
        }
        let Some(fingerprint) = node.structural_hash() else {
            return Ok((UntaggedOutcome::NoCandidate, None));
        };
        let Some(entry) = self.lookup.entry(&fingerprint) else {
            return Ok((UntaggedOutcome::NoCandidate, None));
        };
        // Exclusions are checked before the population counts.
        if self.rules.is_excluded(&entry.candidate) {
            return Ok((UntaggedOutcome::Excluded, None));
        }
        let (entry, ratio) = with_ratio(tree, id, fingerprint, entry)?;
        if !self.thresholds.is_popular(&entry, ratio, node.weight()) {
            return Ok((UntaggedOutcome::BelowThreshold, None));
        }

        debug!(path = node.path(), candidate = %entry.candidate, "popular untagged namespace");
        let candidate = UntaggedCandidate {
            path: node.path().to_string(),
            candidate: entry.candidate,
            match_count: entry.match_count,
            global_count: entry.global_count,
            weight: node.weight(),
        };
        Ok((UntaggedOutcome::Reported, Some(candidate)))
    }
}
