//! Smoke tests for the `cotejo-compare` binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[allow(deprecated)]
fn compare_bin() -> Command {
    Command::cargo_bin("cotejo-compare").unwrap()
}

#[test]
fn test_single_writes_comparison() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("comparacion.json");

    compare_bin()
        .arg("single")
        .arg("--law")
        .arg(fixture("ley_20744.json"))
        .arg("--ops")
        .arg(fixture("ops_reforma.json"))
        .arg("--output")
        .arg(&output)
        .arg("--pretty")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to:"));

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["metadatos"]["ley_numero"], "20744");
    assert_eq!(value["metadatos"]["total_incorporaciones"], 2);
    assert_eq!(value["ley"]["titulos"][0]["articulos"][2]["numero"], "2 bis");
    assert_eq!(value["ley"]["titulos"][0]["articulos"][2]["estado"], "incorporado");
}

#[test]
fn test_single_prints_to_stdout() {
    let assert = compare_bin()
        .arg("single")
        .arg("--law")
        .arg(fixture("ley_20744.json"))
        .arg("--ops")
        .arg(fixture("ops_reforma.json"))
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["metadatos"]["capitulos_derogados"][0], "VIII");
}

#[test]
fn test_single_with_empty_config_reports_missing_chapter() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("corpus.yaml");
    fs::write(&config, "reconcile:\n  chapter_fallbacks: []\n").unwrap();

    compare_bin()
        .arg("single")
        .arg("--law")
        .arg(fixture("ley_20744.json"))
        .arg("--ops")
        .arg(fixture("ops_reforma.json"))
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(dir.path().join("out.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("chapter VIII not found"));
}

#[test]
fn test_batch_writes_comparisons_and_audit() {
    let laws = tempfile::tempdir().unwrap();
    fs::copy(fixture("ley_20744.json"), laws.path().join("ley_20744.json")).unwrap();
    let out = tempfile::tempdir().unwrap();

    compare_bin()
        .arg("batch")
        .arg("--ops")
        .arg(fixture("ops_reforma.json"))
        .arg("--laws-dir")
        .arg(laws.path())
        .arg("--out-dir")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ley 24013 sin árbol"));

    assert!(out.path().join("comparacion_ley_20744.json").exists());
    let audit: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("audit.json")).unwrap()).unwrap();
    let kinds: Vec<&str> = audit
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["tipo"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["ARTICLE_NOT_FOUND_IN_LAW", "ARTICLE_NOT_FOUND_IN_LAW", "LAW_TREE_MISSING"]);
}

#[test]
fn test_missing_ops_file_fails() {
    compare_bin()
        .arg("single")
        .arg("--law")
        .arg(fixture("ley_20744.json"))
        .arg("--ops")
        .arg("does_not_exist.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
