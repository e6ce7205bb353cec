#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{Corpus, stdout_json};
use predicates::prelude::*;

#[test]
fn validate_clean_document_exits_zero() {
    let corpus = Corpus::new(&[
        ("src.md", "# Top\n\n[[target.md#Section One]]\n[local](#Top)\n"),
        ("target.md", "## Section One\n\nbody\n"),
    ]);

    let output = corpus
        .cmd()
        .args(["validate", "src.md", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["summary"]["total"], 2);
    assert_eq!(json["summary"]["valid"], 2);
    assert_eq!(json["summary"]["errors"], 0);
    assert_eq!(json["links"][0]["validation"]["status"], "valid");
}

#[test]
fn validate_broken_anchor_exits_one_with_suggestion() {
    let corpus = Corpus::new(&[
        ("src.md", "[[target.md#Sectoin One]]\n"),
        ("target.md", "## Section One\n"),
    ]);

    let output = corpus
        .cmd()
        .args(["validate", "src.md", "--format", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["summary"]["errors"], 1);
    let validation = &json["links"][0]["validation"];
    assert_eq!(validation["status"], "error");
    assert!(
        validation["error"]
            .as_str()
            .unwrap()
            .contains("Anchor not found")
    );
    assert_eq!(validation["suggestion"], "Section One");
}

#[test]
fn validate_short_name_rescue_warns_with_conversion() {
    let corpus = Corpus::new(&[
        (
            "src.md",
            "[X](../wrong/warning-test-target.md#Test%20Anchor)\n",
        ),
        ("subdir/warning-test-target.md", "# Test Anchor\n"),
    ]);

    let output = corpus
        .cmd()
        .args(["validate", "src.md", "--format", "json"])
        .output()
        .unwrap();

    // Warnings alone do not fail validation
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["summary"]["warnings"], 1);
    let validation = &json["links"][0]["validation"];
    assert_eq!(validation["status"], "warning");
    assert_eq!(validation["pathConversion"]["type"], "path-conversion");
    assert_eq!(
        validation["pathConversion"]["original"],
        "../wrong/warning-test-target.md"
    );
    assert_eq!(
        validation["pathConversion"]["recommended"],
        "subdir/warning-test-target.md"
    );
}

#[test]
fn validate_text_report_shows_summary() {
    let corpus = Corpus::new(&[("src.md", "[gone](missing.md)\n")]);

    corpus
        .cmd()
        .args(["validate", "src.md"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Summary:"))
        .stdout(predicate::str::contains("File not found"));
}

#[test]
fn validate_lines_filter_restricts_report() {
    let corpus = Corpus::new(&[(
        "src.md",
        "[a](missing-one.md)\n\n[b](missing-two.md)\n\n[c](missing-three.md)\n",
    )]);

    let output = corpus
        .cmd()
        .args([
            "validate", "src.md", "--format", "json", "--lines", "3-3",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["summary"]["total"], 1);
    assert_eq!(json["links"][0]["line"], 3);
}

#[test]
fn validate_fix_prints_rewrites_without_touching_files() {
    let corpus = Corpus::new(&[
        ("src.md", "[X](../nope/t.md)\n"),
        ("sub/t.md", "# T\n"),
    ]);
    let before = std::fs::read_to_string(corpus.root.join("src.md")).unwrap();

    corpus
        .cmd()
        .args(["validate", "src.md", "--fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("../nope/t.md"))
        .stdout(predicate::str::contains("sub/t.md"));

    // Source untouched
    let after = std::fs::read_to_string(corpus.root.join("src.md")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn validate_missing_source_is_a_system_error() {
    let corpus = Corpus::new(&[]);

    corpus
        .cmd()
        .args(["validate", "absent.md"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("absent.md"));
}

#[test]
fn validate_bad_line_range_is_a_system_error() {
    let corpus = Corpus::new(&[("src.md", "text\n")]);

    corpus
        .cmd()
        .args(["validate", "src.md", "--lines", "9-3"])
        .assert()
        .code(2);
}
