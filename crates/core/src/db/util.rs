use std::path::Path;

use anyhow::{Context, Result};

use crate::db::FingerprintDb;

/// Open an existing fingerprint database, with a readable error if it is missing.
///
/// Unlike [`FingerprintDb::open`], this refuses to create an empty store: an
/// analysis against an empty database silently finds nothing.
pub fn open_fingerprint_db(path: &Path) -> Result<FingerprintDb> {
    if !path.is_file() {
        anyhow::bail!("Fingerprint database not found at {}", path.display());
    }
    FingerprintDb::open(path)
        .with_context(|| format!("Failed to open fingerprint database at {}", path.display()))
}
