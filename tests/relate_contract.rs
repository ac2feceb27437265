//! Integration tests for `rgr relate`: the three-argument contract, the
//! decode fallback on the input document, and the persisted edge artifact.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use refgraph::OutputEncoding;
use refgraph::infra::io::encode_output;
use serde_json::Value;
use std::process::Command;

fn rgr() -> Command {
    Command::cargo_bin("rgr").expect("rgr binary")
}

const SCENARIO: &str = r#"{
    "a.js": {
        "raw": "function foo(){ bar(); } function bar(){}",
        "functions": {
            "foo": {"body": "function foo(){ bar(); }"},
            "bar": {"body": "function bar(){}"}
        },
        "classes": {}
    }
}"#;

#[test]
fn relate_discovers_the_expected_edges() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let input = tmp.child("aggregate.json");
    input.write_str(SCENARIO).expect("write input");
    let out = tmp.child("edges.json");

    rgr()
        .args(["--quiet", "relate"])
        .arg(input.path())
        .arg("bar")
        .arg(out.path())
        .assert()
        .success();

    let text = std::fs::read_to_string(out.path()).expect("read edges");
    let v: Value = serde_json::from_str(&text).expect("valid json");
    let edges: Vec<(String, String)> = v
        .as_array()
        .expect("array")
        .iter()
        .map(|pair| {
            let pair = pair.as_array().expect("2-element array");
            assert_eq!(pair.len(), 2);
            (
                pair[0].as_str().unwrap().to_string(),
                pair[1].as_str().unwrap().to_string(),
            )
        })
        .collect();

    // foo's body contains "bar(" so the forward edge is present
    assert!(edges.contains(&("a.js.f-foo".to_string(), "a.js.f-bar".to_string())));
    // bar's body has no "foo(" so there is no reverse edge
    assert!(!edges.contains(&("a.js.f-bar".to_string(), "a.js.f-foo".to_string())));
}

#[test]
fn relate_edge_artifact_shape_is_stable() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let input = tmp.child("aggregate.json");
    input.write_str(SCENARIO).expect("write input");
    let out = tmp.child("edges.json");

    rgr()
        .args(["--quiet", "relate"])
        .arg(input.path())
        .arg("bar")
        .arg(out.path())
        .assert()
        .success();

    let text = std::fs::read_to_string(out.path()).expect("read edges");
    insta::assert_snapshot!(text, @r#"
    [
        [
            "a.js",
            "a.js.f-bar"
        ],
        [
            "a.js.f-foo",
            "a.js.f-bar"
        ],
        [
            "a.js.f-bar",
            "a.js.f-bar"
        ],
        [
            "a.js",
            "a.js.f-foo"
        ],
        [
            "a.js.f-foo",
            "a.js.f-foo"
        ]
    ]
    "#);
}

#[test]
fn relate_loads_shift_jis_documents_via_fallback() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    // Shift_JIS bytes that are not valid UTF-8
    let doc = r#"{"a.js": {"raw": "function 日foo(){}"}}"#;
    let bytes = encode_output(doc, OutputEncoding::ShiftJis);
    assert!(std::str::from_utf8(&bytes).is_err());

    let input = tmp.child("aggregate.json");
    input.write_binary(&bytes).expect("write input");
    let out = tmp.child("edges.json");

    rgr()
        .args(["--quiet", "relate"])
        .arg(input.path())
        .arg("foo")
        .arg(out.path())
        .assert()
        .success();

    // Only the file node seeds, and file nodes never expand
    let text = std::fs::read_to_string(out.path()).expect("read edges");
    assert_eq!(text.trim(), "[]");
}

#[test]
fn relate_rejects_documents_valid_in_neither_encoding() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    let input = tmp.child("aggregate.json");
    input.write_binary(&[0xFF, 0xFF, 0xFF]).expect("write input");
    let out = tmp.child("edges.json");

    rgr()
        .args(["--quiet", "relate"])
        .arg(input.path())
        .arg("foo")
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("decode"));

    out.assert(predicate::path::missing());
}

#[test]
fn relate_usage_errors_write_no_output() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let input = tmp.child("aggregate.json");
    input.write_str(SCENARIO).expect("write input");
    let out = tmp.child("edges.json");

    // Too few positional arguments
    rgr()
        .args(["relate"])
        .arg(input.path())
        .arg("bar")
        .assert()
        .failure();

    // Too many positional arguments
    rgr()
        .args(["relate"])
        .arg(input.path())
        .arg("bar")
        .arg(out.path())
        .args(["extra", "extra2"])
        .assert()
        .failure();

    out.assert(predicate::path::missing());
}

#[test]
fn relate_writes_dot_graph_on_request() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let input = tmp.child("aggregate.json");
    input.write_str(SCENARIO).expect("write input");
    let out = tmp.child("edges.json");
    let dot = tmp.child("edges.dot");

    rgr()
        .args(["--quiet", "relate"])
        .arg(input.path())
        .arg("bar")
        .arg(out.path())
        .arg("--dot")
        .arg(dot.path())
        .assert()
        .success();

    let text = std::fs::read_to_string(dot.path()).expect("read dot");
    assert!(text.starts_with("digraph"));
    assert!(text.contains("a.js.f-foo"));
    assert!(text.contains("->"));
}

#[test]
fn relate_honors_shift_jis_output_encoding() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    let doc = r#"{"日本.js": {"raw": "function 日本(){ 日本(); }", "functions": {"日本": {"body": "function 日本(){ 日本(); }"}}}}"#;
    let input = tmp.child("aggregate.json");
    input.write_str(doc).expect("write input");
    let out = tmp.child("edges.json");

    rgr()
        .args(["--quiet", "--output-encoding", "shift-jis", "relate"])
        .arg(input.path())
        .arg("日本")
        .arg(out.path())
        .assert()
        .success();

    // The artifact decodes as Shift_JIS, not UTF-8
    let bytes = std::fs::read(out.path()).expect("read edges");
    assert!(std::str::from_utf8(&bytes).is_err());

    let decoded = refgraph::infra::io::decode_with_fallback(&bytes).expect("decodes");
    assert!(decoded.contains("日本.js.f-日本"));
}
