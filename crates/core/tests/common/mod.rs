#![allow(dead_code)]

use namescope_core::fingerprint::{compute_structural_hashes, Fingerprint};
use namescope_core::lookup::{FingerprintEntry, InMemoryLookup};
use namescope_core::tree::NamespaceTree;

/// Distinct leaf fingerprint per tag.
pub fn fp(tag: &str) -> Fingerprint {
    Fingerprint::of(tag.as_bytes())
}

/// Build and hash a tree from `(path, weight)` pairs; each path's leaf fingerprint is derived from the path.
pub fn hashed_tree(paths: &[(&str, u64)]) -> NamespaceTree {
    let mut tree = NamespaceTree::new();
    for (path, weight) in paths {
        tree.insert(path, *weight, fp(path)).expect("insert");
    }
    compute_structural_hashes(&mut tree);
    tree
}

pub fn hash_at(tree: &NamespaceTree, path: &str) -> Fingerprint {
    let id = tree.find(path).unwrap_or_else(|| panic!("no node for {path}"));
    tree.node(id).structural_hash().expect("hashed")
}

/// Lookup that names `path`'s fingerprint as `candidate` with high confidence.
pub fn confident(lookup: &mut InMemoryLookup, tree: &NamespaceTree, path: &str, candidate: &str) {
    lookup.insert(hash_at(tree, path), FingerprintEntry::new(candidate, 100, 90));
}
