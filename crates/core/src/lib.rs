//! namescope-core
//!
//! Core library for detecting third-party libraries embedded in a compiled
//! application from the shape of its namespace hierarchy.
//!
//! An external extractor supplies, for every namespace path in the binary, a
//! member count and a leaf fingerprint. This crate builds the namespace tree,
//! computes Merkle-style structural fingerprints bottom-up, classifies every
//! namespace against a rule table of known libraries using a fingerprint
//! lookup, and reports the resulting matches.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends (the `namescope` CLI being the first).

pub mod analysis;
pub mod config;
pub mod db;
pub mod fingerprint;
pub mod input;
pub mod lookup;
pub mod matcher;
pub mod report;
pub mod rules;
pub mod tree;
pub mod untagged;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
