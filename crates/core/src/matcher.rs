//! Library matcher: the top-down classification pass.
//!
//! Every node's structural fingerprint is looked up; a confident candidate
//! name is compared with every labelled library. An exact hit records the
//! library on the node itself. A candidate that lies *below* a library root
//! credits the library on the ancestor representing that root, guarded so the
//! credited weight never exceeds the ancestor's weight.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::MatcherThresholds;
use crate::fingerprint::Fingerprint;
use crate::lookup::{FingerprintEntry, FingerprintLookup};
use crate::rules::RuleTable;
use crate::tree::{NamespaceTree, NodeId, Visit};

/// Error type shared by the lookup-driven passes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    /// The lookup violated its contract; the ratio checks are undefined.
    #[error(
        "Fingerprint {fingerprint} at '{path}' names candidate '{candidate}' with zero global popularity; the fingerprint database is corrupt"
    )]
    ZeroPopulation { path: String, fingerprint: Fingerprint, candidate: String },
}

/// Classification of one node by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// The lookup knows nothing about this fingerprint.
    NoCandidate,
    /// A candidate exists but is too rarely confirmed.
    LowConfidence,
    /// The implied library root would sit above the top-level namespaces.
    ExactRootError,
    /// A library was credited on an ancestor and no rule needs a deeper look.
    MatchedShallow,
    /// Default: nothing settled the subtree (exact hits included).
    NeverMatched,
}

impl MatchOutcome {
    /// Only an ancestor-climb match stops descent.
    pub fn visit(self) -> Visit {
        match self {
            MatchOutcome::MatchedShallow => Visit::Prune,
            _ => Visit::Descend,
        }
    }
}

/// Per-outcome counters for one matching pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub visited: usize,
    pub no_candidate: usize,
    pub low_confidence: usize,
    pub root_errors: usize,
    pub matched_shallow: usize,
    pub never_matched: usize,
}

impl MatchStats {
    fn record(&mut self, outcome: MatchOutcome) {
        self.visited += 1;
        let counter = match outcome {
            MatchOutcome::NoCandidate => &mut self.no_candidate,
            MatchOutcome::LowConfidence => &mut self.low_confidence,
            MatchOutcome::ExactRootError => &mut self.root_errors,
            MatchOutcome::MatchedShallow => &mut self.matched_shallow,
            MatchOutcome::NeverMatched => &mut self.never_matched,
        };
        *counter += 1;
    }
}

/// Look up a node's fingerprint and check the population contract.
///
/// `Ok(None)` covers every "unknown" case: no fingerprint, or any fact missing.
pub(crate) fn lookup_node(
    tree: &NamespaceTree,
    id: NodeId,
    lookup: &dyn FingerprintLookup,
) -> Result<Option<(FingerprintEntry, f64)>, MatchError> {
    let Some(fingerprint) = tree.node(id).structural_hash() else {
        return Ok(None);
    };
    let Some(entry) = lookup.entry(&fingerprint) else {
        return Ok(None);
    };
    with_ratio(tree, id, fingerprint, entry).map(Some)
}

/// Pair an entry with its match ratio, rejecting a zero population.
pub(crate) fn with_ratio(
    tree: &NamespaceTree,
    id: NodeId,
    fingerprint: Fingerprint,
    entry: FingerprintEntry,
) -> Result<(FingerprintEntry, f64), MatchError> {
    match entry.match_ratio() {
        Some(ratio) => Ok((entry, ratio)),
        None => Err(MatchError::ZeroPopulation {
            path: tree.node(id).path().to_string(),
            fingerprint,
            candidate: entry.candidate,
        }),
    }
}

/// Segments between `ancestor` and `descendant` when `ancestor` is a strict
/// path-segment prefix of `descendant`.
fn depth_below(ancestor: &str, descendant: &str, separator: char) -> Option<usize> {
    let rest = descendant.strip_prefix(ancestor)?.strip_prefix(separator)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.split(separator).count())
}

/// Drives the matching pass over one tree.
pub struct LibraryMatcher<'a> {
    rules: &'a RuleTable,
    lookup: &'a dyn FingerprintLookup,
    thresholds: &'a MatcherThresholds,
}

impl<'a> LibraryMatcher<'a> {
    pub fn new(
        rules: &'a RuleTable,
        lookup: &'a dyn FingerprintLookup,
        thresholds: &'a MatcherThresholds,
    ) -> Self {
        Self { rules, lookup, thresholds }
    }

    /// Classify every reachable node in pre-order, recording matches in the tree.
    pub fn run(&self, tree: &mut NamespaceTree) -> Result<MatchStats, MatchError> {
        let mut stats = MatchStats::default();
        tree.try_pre_order_mut(|tree, id| {
            let outcome = self.visit(tree, id)?;
            stats.record(outcome);
            Ok(outcome.visit())
        })?;
        Ok(stats)
    }

    /// Classify a single node.
    ///
    /// Every labelled library is evaluated; an exact hit does not end the scan
    /// because nested libraries may share the candidate's subtree.
    pub fn visit(&self, tree: &mut NamespaceTree, id: NodeId) -> Result<MatchOutcome, MatchError> {
        let Some((entry, ratio)) = lookup_node(tree, id, self.lookup)? else {
            return Ok(MatchOutcome::NoCandidate);
        };
        if !self.thresholds.is_confident(&entry, ratio) {
            debug!(path = tree.node(id).path(), candidate = %entry.candidate, "low confidence");
            return Ok(MatchOutcome::LowConfidence);
        }

        let separator = tree.separator();
        let weight = tree.node(id).weight();
        let candidate = entry.candidate.as_str();
        let mut credited_ancestor = false;
        let mut needs_deeper = false;

        for (rule, lib) in self.rules.labeled() {
            let lib_path = lib.canonical_path.as_str();
            if lib_path == candidate {
                tree.push_match(id, rule);
                debug!(path = tree.node(id).path(), library = %lib.label, "exact library match");
                needs_deeper = true;
                continue;
            }
            // A rule below the candidate is settled when descent reaches it.
            if depth_below(candidate, lib_path, separator).is_some() {
                needs_deeper = true;
                continue;
            }
            let Some(depth_diff) = depth_below(lib_path, candidate, separator) else {
                continue;
            };
            let Some(root) = tree.climb(id, depth_diff) else {
                warn!(
                    path = tree.node(id).path(),
                    candidate,
                    library = %lib.label,
                    "library root would lie above the top-level namespace; skipping node"
                );
                return Ok(MatchOutcome::ExactRootError);
            };
            tree.credit_match(root, rule, weight);
            debug!(
                path = tree.node(id).path(),
                root = tree.node(root).path(),
                library = %lib.label,
                "credited library on ancestor"
            );
            credited_ancestor = true;
        }

        Ok(if credited_ancestor && !needs_deeper {
            MatchOutcome::MatchedShallow
        } else {
            MatchOutcome::NeverMatched
        })
    }
}
