//! Structural fingerprints and the bottom-up hashing pass.
//!
//! A [`Fingerprint`] is a fixed-size SHA-256 digest. Leaf namespaces receive
//! their fingerprint from the extractor; every namespace with children gets a
//! fingerprint derived from the sorted multiset of its children's fingerprints,
//! which makes it independent of segment names and insertion order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::tree::NamespaceTree;

/// Width of a fingerprint in bytes.
pub const FINGERPRINT_LEN: usize = 32;

/// Error type for parsing fingerprints.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("Invalid fingerprint hex: {0}")]
    InvalidHex(String),

    #[error("Fingerprint must be {expected} bytes, got {found}")]
    InvalidLength { expected: usize, found: usize },
}

/// Opaque structural digest of a namespace subtree.
///
/// Ordering is plain byte order, which is what the hashing pass sorts by.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, FingerprintError> {
        let array: [u8; FINGERPRINT_LEN] = bytes.try_into().map_err(|_| {
            FingerprintError::InvalidLength { expected: FINGERPRINT_LEN, found: bytes.len() }
        })?;
        Ok(Self(array))
    }

    pub fn from_hex(text: &str) -> Result<Self, FingerprintError> {
        let bytes =
            hex::decode(text.trim()).map_err(|e| FingerprintError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Digest arbitrary content. Extractors and fixtures use this to derive leaf fingerprints.
    pub fn of(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Fold child fingerprints into a parent fingerprint.
    ///
    /// Children are sorted by byte value before hashing, so the result only
    /// depends on the multiset of inputs. No children yields the digest of the
    /// empty string.
    pub fn combine<I>(children: I) -> Self
    where
        I: IntoIterator<Item = Fingerprint>,
    {
        let mut items: Vec<Fingerprint> = children.into_iter().collect();
        items.sort_unstable();

        let mut hasher = Sha256::new();
        for item in &items {
            hasher.update(item.0);
        }
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// Compute structural fingerprints for the whole tree in strict post-order.
///
/// Leaves that already carry an extractor-supplied fingerprint are left alone.
/// Every node with children is recomputed from its children, overwriting any
/// fingerprint it was given at insertion. Returns the number of nodes hashed.
pub fn compute_structural_hashes(tree: &mut NamespaceTree) -> usize {
    let mut hashed = 0;
    for id in tree.post_order() {
        let node = tree.node(id);
        if node.is_leaf() && node.structural_hash().is_some() {
            continue;
        }
        let child_hashes: Vec<Fingerprint> =
            node.children().filter_map(|child| tree.node(child).structural_hash()).collect();
        let combined = Fingerprint::combine(child_hashes);
        tree.set_structural_hash(id, combined);
        hashed += 1;
    }
    debug!(hashed, nodes = tree.len(), "computed structural fingerprints");
    hashed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_is_order_independent() {
        let a = Fingerprint::of(b"a");
        let b = Fingerprint::of(b"b");
        let c = Fingerprint::of(b"c");
        assert_eq!(Fingerprint::combine([a, b, c]), Fingerprint::combine([c, a, b]));
    }

    #[test]
    fn combine_is_sensitive_to_multiplicity() {
        let a = Fingerprint::of(b"a");
        assert_ne!(Fingerprint::combine([a]), Fingerprint::combine([a, a]));
    }

    #[test]
    fn combine_of_nothing_is_empty_digest() {
        assert_eq!(Fingerprint::combine(Vec::new()), Fingerprint::of(b""));
    }

    #[test]
    fn hex_rejects_wrong_length() {
        let err = Fingerprint::from_hex("abcd").unwrap_err();
        assert_eq!(err, FingerprintError::InvalidLength { expected: 32, found: 2 });
        assert!(matches!(Fingerprint::from_hex("zz"), Err(FingerprintError::InvalidHex(_))));
    }

    #[test]
    fn hex_parse_matches_display() {
        let fp = Fingerprint::of(b"leaf");
        let parsed: Fingerprint = fp.to_string().parse().unwrap();
        assert_eq!(parsed, fp);
    }
}
