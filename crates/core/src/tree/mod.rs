//! Namespace tree: the path hierarchy of one analyzed binary.
//!
//! Nodes live in an arena owned by [`NamespaceTree`] and refer to each other by
//! [`NodeId`]. Children are owned through the arena; the parent link is a plain
//! id, so there are no reference cycles. The tree is write-once: nodes are only
//! ever added, weights only grow, and per-node match lists are filled by a
//! single matching pass.

use std::collections::BTreeMap;
use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::fingerprint::Fingerprint;
use crate::rules::RuleId;

/// Default namespace separator (`Lcom/example/sdk`).
pub const DEFAULT_SEPARATOR: char = '/';

/// Error type for tree construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Namespace path is empty")]
    EmptyPath,

    #[error("Namespace path '{0}' contains an empty segment")]
    EmptySegment(String),
}

/// Convenience result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Handle to a node inside a [`NamespaceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Control value returned by traversal callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Continue into this node's children.
    Descend,
    /// Do not visit this node's children.
    Prune,
}

/// A library attributed to a node together with the weight credited to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryMatch {
    pub rule: RuleId,
    pub weight: u64,
}

/// One namespace in the tree.
#[derive(Debug, Clone)]
pub struct NamespaceNode {
    structural_hash: Option<Fingerprint>,
    weight: u64,
    path: String,
    depth: usize,
    parent: Option<NodeId>,
    children: BTreeMap<String, NodeId>,
    matches: Vec<LibraryMatch>,
}

impl NamespaceNode {
    fn new(path: String, depth: usize, weight: u64, parent: Option<NodeId>) -> Self {
        Self {
            structural_hash: None,
            weight,
            path,
            depth,
            parent,
            children: BTreeMap::new(),
            matches: Vec::new(),
        }
    }

    pub fn structural_hash(&self) -> Option<Fingerprint> {
        self.structural_hash
    }

    /// Total member count of every inserted path through or ending at this node.
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Full namespace path from the root; empty for the root itself.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of path segments (0 for the root).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Child ids in segment order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }

    pub fn child(&self, segment: &str) -> Option<NodeId> {
        self.children.get(segment).copied()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn matches(&self) -> &[LibraryMatch] {
        &self.matches
    }
}

/// Arena-backed namespace hierarchy for one analysis run.
#[derive(Debug, Clone)]
pub struct NamespaceTree {
    nodes: Vec<NamespaceNode>,
    separator: char,
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTree {
    /// Create an empty tree using [`DEFAULT_SEPARATOR`].
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    pub fn with_separator(separator: char) -> Self {
        Self { nodes: vec![NamespaceNode::new(String::new(), 0, 0, None)], separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, including the synthetic root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing has been inserted yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Borrow a node.
    ///
    /// Ids are only handed out by this tree, so an id from another tree is a
    /// caller bug and panics on an out-of-range index.
    pub fn node(&self, id: NodeId) -> &NamespaceNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NamespaceNode)> {
        self.nodes.iter().enumerate().map(|(idx, node)| (NodeId(idx), node))
    }

    /// Insert one namespace path observed in the binary.
    ///
    /// Every node on the way down (the root included) has `weight` added to it;
    /// missing nodes are created. The terminal node receives `leaf_hash`. Inserting
    /// the same full path twice keeps the later fingerprint.
    pub fn insert(&mut self, path: &str, weight: u64, leaf_hash: Fingerprint) -> TreeResult<NodeId> {
        if path.is_empty() {
            return Err(TreeError::EmptyPath);
        }
        if path.split(self.separator).any(str::is_empty) {
            return Err(TreeError::EmptySegment(path.to_string()));
        }

        let root = self.root();
        self.nodes[root.0].weight = self.nodes[root.0].weight.saturating_add(weight);

        let mut cursor = root;
        for segment in path.split(self.separator) {
            let existing = self.nodes[cursor.0].children.get(segment).copied();
            cursor = match existing {
                Some(child) => {
                    let node = &mut self.nodes[child.0];
                    node.weight = node.weight.saturating_add(weight);
                    child
                }
                None => self.add_child(cursor, segment, weight),
            };
        }

        let node = &mut self.nodes[cursor.0];
        if node.structural_hash.is_some() {
            debug!(path, "namespace inserted twice, keeping the later leaf fingerprint");
        }
        node.structural_hash = Some(leaf_hash);
        Ok(cursor)
    }

    fn add_child(&mut self, parent: NodeId, segment: &str, weight: u64) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent_node = &self.nodes[parent.0];
        let path = if parent_node.path.is_empty() {
            segment.to_string()
        } else {
            format!("{}{}{}", parent_node.path, self.separator, segment)
        };
        let depth = parent_node.depth + 1;
        self.nodes.push(NamespaceNode::new(path, depth, weight, Some(parent)));
        self.nodes[parent.0].children.insert(segment.to_string(), id);
        id
    }

    /// Find the node for a full namespace path.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        if path.is_empty() {
            return Some(self.root());
        }
        let mut cursor = self.root();
        for segment in path.split(self.separator) {
            cursor = self.node(cursor).child(segment)?;
        }
        Some(cursor)
    }

    /// Walk `steps` parents up from `from`.
    ///
    /// The walk may end on a top-level namespace but never on the synthetic
    /// root; `None` means the walk would have to leave the real namespaces.
    pub fn climb(&self, from: NodeId, steps: usize) -> Option<NodeId> {
        let mut cursor = from;
        for _ in 0..steps {
            let parent = self.node(cursor).parent?;
            if self.node(parent).is_root() {
                return None;
            }
            cursor = parent;
        }
        Some(cursor)
    }

    /// All node ids, children strictly before their parent.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root(), false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                out.push(id);
                continue;
            }
            stack.push((id, true));
            for child in self.node(id).children().rev() {
                stack.push((child, false));
            }
        }
        out
    }

    /// Pre-order traversal with read-only access; the callback decides descent.
    pub fn pre_order<F>(&self, mut visit: F)
    where
        F: FnMut(&NamespaceTree, NodeId) -> Visit,
    {
        let result: Result<(), Infallible> = self.try_pre_order(|tree, id| Ok(visit(tree, id)));
        match result {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Fallible pre-order traversal; the first error stops the walk.
    pub fn try_pre_order<E, F>(&self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&NamespaceTree, NodeId) -> Result<Visit, E>,
    {
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if visit(self, id)? == Visit::Descend {
                stack.extend(self.node(id).children().rev());
            }
        }
        Ok(())
    }

    /// Pre-order traversal whose callback may record matches anywhere in the tree.
    pub(crate) fn try_pre_order_mut<E, F>(&mut self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&mut NamespaceTree, NodeId) -> Result<Visit, E>,
    {
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if visit(self, id)? == Visit::Descend {
                stack.extend(self.node(id).children().rev());
            }
        }
        Ok(())
    }

    pub(crate) fn set_structural_hash(&mut self, id: NodeId, hash: Fingerprint) {
        self.nodes[id.0].structural_hash = Some(hash);
    }

    /// Record an exact library match at `id` with the node's full weight.
    pub(crate) fn push_match(&mut self, id: NodeId, rule: RuleId) {
        let node = &mut self.nodes[id.0];
        let weight = node.weight;
        node.matches.push(LibraryMatch { rule, weight });
    }

    /// Credit `weight` to `rule` at an ancestor node.
    ///
    /// An existing entry only grows while it is below the ancestor's own weight,
    /// and never past it.
    pub(crate) fn credit_match(&mut self, at: NodeId, rule: RuleId, weight: u64) {
        let node = &mut self.nodes[at.0];
        let cap = node.weight;
        let mut found = false;
        for entry in node.matches.iter_mut().filter(|entry| entry.rule == rule) {
            found = true;
            if entry.weight != cap {
                entry.weight = entry.weight.saturating_add(weight).min(cap);
            }
        }
        if !found {
            node.matches.push(LibraryMatch { rule, weight: weight.min(cap) });
        }
    }
}
