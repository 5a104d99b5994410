//! Binary behaviour that does not need a live model

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

fn empty_config() -> NamedTempFile {
    NamedTempFile::new().unwrap()
}

fn turn_adapter(config: &NamedTempFile) -> Command {
    let mut cmd = Command::cargo_bin("turn-adapter").unwrap();
    cmd.arg("--config").arg(config.path());
    cmd
}

#[test]
fn messages_prints_grouped_payload() {
    let config = empty_config();
    let output = turn_adapter(&config)
        .args(["messages", "--system", "Be terse.", "hello", "@@there"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let payload: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        payload,
        json!([
            {"role": "system", "content": "Be terse."},
            {"role": "human", "content": [
                {"type": "text", "text": "hello"},
                {"type": "text", "text": "@there"}
            ]}
        ])
    );
}

#[test]
fn messages_uses_configured_template() {
    let mut config = empty_config();
    writeln!(config, "prompt_template = \"Q: {{{{ messages | transcript }}}}\"").unwrap();

    turn_adapter(&config)
        .args(["messages", "--role", "model", "earlier answer"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""input": "Q: AI: earlier answer""#));
}

#[test]
fn messages_reads_jsonl_parts() {
    let config = empty_config();
    let mut parts = NamedTempFile::new().unwrap();
    writeln!(
        parts,
        r#"{{"mimetype":"image/png","role":"user","data":"iVBORw==","metadata":{{"source":"cam"}}}}"#
    )
    .unwrap();

    turn_adapter(&config)
        .args(["messages", "describe"])
        .arg("--parts")
        .arg(parts.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("data:image/png;base64,iVBORw=="))
        .stdout(predicate::str::contains(r#""source": "cam""#));
}

#[test]
fn unsupported_input_exits_with_error() {
    let config = empty_config();
    let mut blob = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
    blob.write_all(&[0, 1, 2]).unwrap();

    turn_adapter(&config)
        .arg("messages")
        .arg(format!("@{}", blob.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Unsupported mimetype: application/octet-stream",
        ));
}

#[test]
fn missing_config_file_is_an_error() {
    Command::cargo_bin("turn-adapter")
        .unwrap()
        .args(["--config", "/nonexistent/turn-adapter.toml", "messages", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn version_prints_package_version() {
    let config = empty_config();
    turn_adapter(&config)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
