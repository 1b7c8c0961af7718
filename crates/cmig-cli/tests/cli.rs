//! Runs the `cmig` binary end to end

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const DISPLAY_INVOICES: &str = r#"{
  "name": "DisplayInvoicesCmdImpl",
  "invocation_method": "performExecute",
  "context_accesses": ["getUserId"],
  "properties": { "invoiceId": "string" }
}"#;

const LOYALTY_LOOKUP: &str = r#"{
  "name": "DisplayInvoices",
  "invocation_method": "performExecute",
  "context_accesses": ["getUserId", "getLoyaltyTier"],
  "properties": { "invoiceId": "string" }
}"#;

const ORPHAN: &str = r#"{ "name": "Orphan", "context_accesses": ["getUserId"] }"#;

fn cmig(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cmig"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn convert_scenario_a() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "display.json", DISPLAY_INVOICES);
    let output = cmig(&["convert", &file]);
    assert_eq!(output.status.code(), Some(0));

    let json = stdout_json(&output);
    assert_eq!(json["input_type"], "RequestHandler");
    assert_eq!(json["validation"], "Valid");
    assert_eq!(json["unresolved"], serde_json::json!([]));
    let ids: Vec<&str> = json["artifacts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["identifier"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"DisplayInvoicesController"));
    assert!(ids.contains(&"displayInvoicesWiring"));
}

#[test]
fn convert_scenario_b_reports_unresolved() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "loyalty.yaml", LOYALTY_LOOKUP);
    let output = cmig(&["convert", &file, "--pretty"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_json(&output)["unresolved"],
        serde_json::json!(["getLoyaltyTier"])
    );
}

#[test]
fn convert_scenario_c_is_a_job_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "orphan.json", ORPHAN);
    let output = cmig(&["convert", &file]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["error"], "MalformedInput");
}

#[test]
fn convert_with_render_writes_sources() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "display.json", DISPLAY_INVOICES);
    let out = dir.path().join("out");
    let output = cmig(&["convert", &file, "--render", out.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert!(out
        .join("DisplayInvoices/DisplayInvoices.result.json")
        .is_file());
    assert!(out
        .join("DisplayInvoices/src/main/resources/displayInvoicesWiring-spring.xml")
        .is_file());
}

#[test]
fn missing_rule_table_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "display.json", DISPLAY_INVOICES);
    let output = cmig(&["convert", &file, "--rules", "/nonexistent/rules.yaml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn bad_config_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "cmig.toml", "threads = \"many\"");
    let output = cmig(&["rules", "--config", &config]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn batch_summary() {
    let input = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    write(input.path(), "a.json", DISPLAY_INVOICES);
    write(input.path(), "b.json", ORPHAN);

    let output = cmig(&[
        "batch",
        input.path().to_str().unwrap(),
        output_dir.path().to_str().unwrap(),
        "--threads",
        "2",
        "--no-render",
    ]);
    assert_eq!(output.status.code(), Some(1));

    let summary = stdout_json(&output);
    let statuses: Vec<&str> = summary["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["converted", "failed"]);
    assert_eq!(summary["job_id"].as_str().unwrap().len(), 26);
}

#[test]
fn rules_round_trip_through_toml() {
    let dir = tempfile::tempdir().unwrap();
    let output = cmig(&["rules", "--format", "toml"]);
    assert_eq!(output.status.code(), Some(0));
    let rules = write(
        dir.path(),
        "rules.toml",
        std::str::from_utf8(&output.stdout).unwrap(),
    );

    let file = write(dir.path(), "display.json", DISPLAY_INVOICES);
    let with_file = cmig(&["convert", &file, "--rules", &rules]);
    let built_in = cmig(&["convert", &file]);
    assert_eq!(with_file.stdout, built_in.stdout);
}

#[test]
fn schema_for_input() {
    let output = cmig(&["schema", "input"]);
    assert_eq!(output.status.code(), Some(0));
    let schema = stdout_json(&output);
    assert_eq!(schema["title"], "RawCommand");
    assert!(schema["properties"]["invocation_method"].is_object());
}
