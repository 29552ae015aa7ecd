mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

use common::write_fixture;

#[test]
fn analyze_prints_libraries_and_unknown_packages() {
    let dir = tempdir().expect("tempdir");
    let fx = write_fixture(dir.path());

    cargo_bin_cmd!("namescope")
        .arg("analyze")
        .arg("--input")
        .arg(&fx.input)
        .arg("--rules")
        .arg(&fx.rules)
        .arg("--db")
        .arg(&fx.db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Library: Gson"))
        .stdout(predicate::str::contains("Similarity: 107/107"))
        .stdout(predicate::str::contains("Match Package: Lorg/popular"));
}

#[test]
fn analyze_json_output_parses() {
    let dir = tempdir().expect("tempdir");
    let fx = write_fixture(dir.path());

    let output = cargo_bin_cmd!("namescope")
        .arg("analyze")
        .arg("--input")
        .arg(&fx.input)
        .arg("--rules")
        .arg(&fx.rules)
        .arg("--db")
        .arg(&fx.db)
        .arg("--json")
        .output()
        .expect("run analyze");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["libraries"][0]["library"], "Gson");
    assert_eq!(report["libraries"][0]["path"], "La/b");
    assert_eq!(report["untagged"][0]["path"], "Lz/q");
    assert_eq!(report["stats"]["entries"], 5);
}

#[test]
fn analyze_reads_sources_from_config() {
    let dir = tempdir().expect("tempdir");
    let fx = write_fixture(dir.path());
    let config = dir.path().join("namescope.json");
    std::fs::write(&config, r#"{"rules": "tag_rules.csv", "fingerprint_db": "fingerprints.db"}"#)
        .unwrap();

    cargo_bin_cmd!("namescope")
        .arg("analyze")
        .arg("--input")
        .arg(&fx.input)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Library: Gson"));
}

#[test]
fn analyze_without_rules_fails_with_hint() {
    let dir = tempdir().expect("tempdir");
    let fx = write_fixture(dir.path());

    cargo_bin_cmd!("namescope")
        .arg("analyze")
        .arg("--input")
        .arg(&fx.input)
        .arg("--db")
        .arg(&fx.db)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No rule table given"));
}

#[test]
fn list_rules_shows_libraries_and_exclusions() {
    let dir = tempdir().expect("tempdir");
    let fx = write_fixture(dir.path());

    cargo_bin_cmd!("namescope")
        .arg("list-rules")
        .arg("--rules")
        .arg(&fx.rules)
        .assert()
        .success()
        .stdout(predicate::str::contains("Libraries (1):"))
        .stdout(predicate::str::contains("Gson [Development Aid] Lcom/google/gson"))
        .stdout(predicate::str::contains("Exclusions (1):"));
}

#[test]
fn lookup_reports_known_and_unknown_fingerprints() {
    let dir = tempdir().expect("tempdir");
    let fx = write_fixture(dir.path());

    cargo_bin_cmd!("namescope")
        .arg("lookup")
        .arg("--db")
        .arg(&fx.db)
        .arg("--fingerprint")
        .arg(fx.gson_fingerprint.to_hex())
        .assert()
        .success()
        .stdout(predicate::str::contains("Candidate: Lcom/google/gson"))
        .stdout(predicate::str::contains("Popularity: 900"));

    cargo_bin_cmd!("namescope")
        .arg("lookup")
        .arg("--db")
        .arg(&fx.db)
        .arg("--fingerprint")
        .arg("00".repeat(32))
        .assert()
        .success()
        .stdout(predicate::str::contains("Candidate: (unknown)"));
}

#[test]
fn init_config_writes_defaults_once() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("conf/namescope.json");

    cargo_bin_cmd!("namescope").arg("init-config").arg("--path").arg(&path).assert().success();
    let body = std::fs::read_to_string(&path).expect("config written");
    assert!(body.contains("\"min_match_count\": 8"));

    cargo_bin_cmd!("namescope")
        .arg("init-config")
        .arg("--path")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}
