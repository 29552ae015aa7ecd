//! SQLite-backed fingerprint store.
//!
//! The store maps a structural fingerprint to the candidate namespace it was
//! observed under and its popularity counts. Populating it is someone else's
//! job; this module opens it, migrates the schema, and answers lookups.

mod fingerprint_db;
mod util;

pub use fingerprint_db::*;
pub use util::*;
