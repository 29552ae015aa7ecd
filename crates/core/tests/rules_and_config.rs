use std::fs;

use namescope_core::config::{load_config, AnalysisConfig};
use namescope_core::input::{load_entries, InputError, NamespaceEntry};
use namescope_core::fingerprint::Fingerprint;
use namescope_core::rules::{LibraryRecord, RuleError, RuleTable};
use tempfile::tempdir;

#[test]
fn rule_table_loads_csv_json_and_yaml() {
    let dir = tempdir().expect("tempdir");

    let csv_path = dir.path().join("tag_rules.csv");
    fs::write(
        &csv_path,
        "Lcom/google/gson,Gson,Development Aid,https://github.com/google/gson\nLcom/myapp,no,,\n",
    )
    .unwrap();
    let table = RuleTable::load(&csv_path).expect("load csv");
    assert_eq!(table.labeled_len(), 1);
    assert!(table.is_excluded("Lcom/myapp"));

    let records = vec![
        LibraryRecord::new("Lcom/unity3d", "Unity3D", "Game Engine", "https://unity.com"),
        LibraryRecord::new("Lcom/unity3d/ads", "UnityAds", "Advertisement", "https://unity.com"),
    ];
    let json_path = dir.path().join("rules.json");
    fs::write(&json_path, serde_json::to_string_pretty(&records).unwrap()).unwrap();
    let table = RuleTable::load(&json_path).expect("load json");
    let labels: Vec<&str> = table.labeled().map(|(_, r)| r.label.as_str()).collect();
    assert_eq!(labels, vec!["Unity3D", "UnityAds"]);

    let yaml_path = dir.path().join("rules.yaml");
    fs::write(
        &yaml_path,
        "- canonical_path: Lokio\n  label: Okio\n  category: Development Aid\n  website: https://square.github.io/okio\n",
    )
    .unwrap();
    let table = RuleTable::load(&yaml_path).expect("load yaml");
    assert_eq!(table.labeled_len(), 1);
}

#[test]
fn rule_table_rejects_unknown_extension_and_missing_file() {
    let dir = tempdir().expect("tempdir");
    let toml = dir.path().join("rules.toml");
    fs::write(&toml, "").unwrap();
    assert!(matches!(RuleTable::load(&toml), Err(RuleError::UnsupportedFormat(ext)) if ext == "toml"));
    assert!(matches!(RuleTable::load(&dir.path().join("none.csv")), Err(RuleError::Io { .. })));
}

#[test]
fn load_config_resolves_relative_paths_against_config_dir() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("namescope.json");
    fs::write(
        &config_path,
        r#"{"separator": ".", "rules": "rules.csv", "fingerprint_db": "/abs/fp.db", "untagged": {"min_weight": 5}}"#,
    )
    .unwrap();

    let config = load_config(&config_path).expect("load config");
    assert_eq!(config.separator, '.');
    assert_eq!(config.rules.as_deref(), Some(dir.path().join("rules.csv").as_path()));
    assert_eq!(config.fingerprint_db.as_deref(), Some(std::path::Path::new("/abs/fp.db")));
    assert_eq!(config.untagged.min_weight, 5);
    assert_eq!(config.untagged.min_match_count, 100);
}

#[test]
fn load_config_reports_parse_errors_with_context() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("broken.json");
    fs::write(&config_path, "not-json").unwrap();
    let err = load_config(&config_path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config JSON"), "unexpected: {err}");

    let err = load_config(&dir.path().join("missing.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config"), "unexpected: {err}");
}

#[test]
fn default_config_serializes_and_reloads() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("defaults.yaml");
    fs::write(&config_path, serde_yaml::to_string(&AnalysisConfig::default()).unwrap()).unwrap();
    assert_eq!(load_config(&config_path).unwrap(), AnalysisConfig::default());
}

#[test]
fn namespace_listing_loads_from_json() {
    let dir = tempdir().expect("tempdir");
    let entries = vec![
        NamespaceEntry::new("Lcom/a", 3, Fingerprint::of(b"a")),
        NamespaceEntry::new("Lcom/b", 4, Fingerprint::of(b"b")),
    ];
    let path = dir.path().join("namespaces.json");
    fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();
    assert_eq!(load_entries(&path).unwrap(), entries);

    let other = dir.path().join("namespaces.xml");
    fs::write(&other, "").unwrap();
    assert!(matches!(load_entries(&other), Err(InputError::UnsupportedFormat(_))));
}
