#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use namescope_core::db::FingerprintDb;
use namescope_core::fingerprint::{compute_structural_hashes, Fingerprint};
use namescope_core::input::NamespaceEntry;
use namescope_core::lookup::FingerprintEntry;
use namescope_core::tree::NamespaceTree;

pub struct Fixture {
    pub input: PathBuf,
    pub rules: PathBuf,
    pub db: PathBuf,
    pub gson_fingerprint: Fingerprint,
}

const NAMESPACES: [(&str, u64); 5] =
    [("La/b", 40), ("La/b/c", 24), ("La/b/d", 43), ("Lcom/myapp/ui", 12), ("Lz/q", 70)];

/// Write an obfuscated gson build, a rule table and a seeded fingerprint store into `dir`.
pub fn write_fixture(dir: &Path) -> Fixture {
    let entries: Vec<NamespaceEntry> = NAMESPACES
        .iter()
        .map(|(path, weight)| NamespaceEntry::new(*path, *weight, Fingerprint::of(path.as_bytes())))
        .collect();
    let input = dir.join("namespaces.json");
    fs::write(&input, serde_json::to_string_pretty(&entries).unwrap()).unwrap();

    let rules = dir.join("tag_rules.csv");
    fs::write(
        &rules,
        "Lcom/google/gson,Gson,Development Aid,https://github.com/google/gson\nLcom/myapp,no,,\n",
    )
    .unwrap();

    let mut tree = NamespaceTree::new();
    for entry in &entries {
        tree.insert(&entry.path, entry.weight, entry.fingerprint).unwrap();
    }
    compute_structural_hashes(&mut tree);
    let hash = |path: &str| tree.node(tree.find(path).unwrap()).structural_hash().unwrap();

    let db = dir.join("fingerprints.db");
    let store = FingerprintDb::open(&db).unwrap();
    let gson_fingerprint = hash("La/b");
    store
        .insert_entry(&gson_fingerprint, &FingerprintEntry::new("Lcom/google/gson", 900, 850))
        .unwrap();
    store.insert_entry(&hash("Lz/q"), &FingerprintEntry::new("Lorg/popular", 300, 280)).unwrap();

    Fixture { input, rules, db, gson_fingerprint }
}
