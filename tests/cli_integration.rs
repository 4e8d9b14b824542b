//! Integration tests for the switchboard CLI
//!
//! Each test runs the built binary against an isolated SWITCHBOARD_DIR with
//! the offline echo provider, so no network or API key is needed. With echo,
//! prompt agents answer with their rendered prompt and the router never
//! produces a usable decision.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;

const MANIFEST: &str = r#"
- name: echo_agent
  description: Repeats its input.
  required_inputs: [input]
  prompt: "Echo: {input}"
- name: sql_generator_agent
  description: Generates SQL queries from plain English instructions.
  required_inputs: [instruction]
  path: tools.sql_generator
"#;

/// Helper to get the switchboard binary path
fn switchboard_binary() -> PathBuf {
    // When running tests, the binary is in target/debug/switchboard
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove deps
    path.push("switchboard");
    path
}

/// Helper to run switchboard with a custom directory
fn run_switchboard(dir: &Path, args: &[&str]) -> Output {
    Command::new(switchboard_binary())
        .env("SWITCHBOARD_DIR", dir)
        .env_remove("SWITCHBOARD_CONFIG")
        .env_remove("RUST_LOG")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute switchboard")
}

/// Run and parse stdout as JSON, asserting success
fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = run_switchboard(dir, args);
    assert!(
        output.status.success(),
        "switchboard {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

/// Temp SWITCHBOARD_DIR with an echo-provider config and a small manifest
fn setup_test_env() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("switchboard.yaml"), "provider:\n  kind: echo\nlog_level: debug\n").unwrap();
    fs::write(temp.path().join("agents_manifest.yaml"), MANIFEST).unwrap();
    temp
}

#[test]
fn test_mem_starts_empty() {
    let temp = setup_test_env();
    assert_eq!(run_json(temp.path(), &["mem", "-o", "json"]), json!({}));
}

#[test]
fn test_agents_lists_manifest_in_order() {
    let temp = setup_test_env();
    let agents = run_json(temp.path(), &["agents", "-o", "json"]);

    assert_eq!(agents[0]["name"], "echo_agent");
    assert_eq!(agents[1]["name"], "sql_generator_agent");
    assert_eq!(agents[1]["required_inputs"], json!(["instruction"]));
}

#[test]
fn test_agent_direct_invocation() {
    let temp = setup_test_env();
    let result = run_json(temp.path(), &["agent", "echo_agent", "input=hello", "-o", "json"]);
    assert_eq!(result, json!({"agent": "echo_agent", "output": {"output": "Echo: hello"}}));
}

#[test]
fn test_agent_builtin_tool() {
    let temp = setup_test_env();
    let result = run_json(
        temp.path(),
        &["agent", "sql_generator_agent", "instruction=count orders", "dialect=SQLite", "-o", "json"],
    );

    let sql = result["output"]["sql"].as_str().unwrap();
    assert!(sql.contains("Instruction:\ncount orders"));
    assert!(sql.contains("SQL Dialect: SQLite"));
    assert!(sql.ends_with(';'));
}

#[test]
fn test_agent_unknown_fails() {
    let temp = setup_test_env();
    let output = run_switchboard(temp.path(), &["agent", "ghost_agent", "x=1"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Agent not found: ghost_agent"));
}

#[test]
fn test_agent_rejects_malformed_pair() {
    let temp = setup_test_env();
    let output = run_switchboard(temp.path(), &["agent", "echo_agent", "oops"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Use 'key=value'"));
}

#[test]
fn test_file_command_reads_content() {
    let temp = setup_test_env();
    let file = temp.path().join("note.txt");
    fs::write(&file, "from a file").unwrap();

    let result = run_json(temp.path(), &["file", "echo_agent", file.to_str().unwrap(), "-o", "json"]);
    assert_eq!(result["output"]["output"], "Echo: from a file");
}

#[test]
fn test_instruct_routing_failure_leaves_memory_alone() {
    let temp = setup_test_env();
    let result = run_json(temp.path(), &["instruct", "-o", "json", "write", "an", "email"]);

    assert_eq!(result["error"], "Could not determine appropriate agent.");
    assert_eq!(result["input"], "write an email");
    assert_eq!(run_json(temp.path(), &["mem", "-o", "json"]), json!({}));
}

#[test]
fn test_json_command_routes_document() {
    let temp = setup_test_env();
    let request = temp.path().join("request.json");
    fs::write(&request, r#"{"instruction": "list users"}"#).unwrap();

    let result = run_json(temp.path(), &["json", request.to_str().unwrap(), "-o", "json"]);
    assert_eq!(result["input"], r#"{"instruction":"list users"}"#);
}

#[test]
fn test_json_command_rejects_non_mapping_document() {
    let temp = setup_test_env();
    let request = temp.path().join("request.json");
    fs::write(&request, "[1, 2, 3]").unwrap();

    let result = run_json(temp.path(), &["json", request.to_str().unwrap(), "-o", "json"]);
    assert_eq!(result, json!({"error": "Invalid input format."}));
    assert_eq!(run_json(temp.path(), &["mem", "-o", "json"]), json!({}));
}

#[test]
fn test_workflow_threads_outputs_and_persists_memory() {
    let temp = setup_test_env();
    let flow = temp.path().join("flow.json");
    fs::write(
        &flow,
        r#"{"input": {
            "topic": "placeholder",
            "steps": [
                {"agent": "echo_agent", "input": {"input": "{topic}"}},
                {"agent": "echo_agent", "input": {"input": "again {output_1}"}, "output_key": "final"}
            ]
        }}"#,
    )
    .unwrap();

    let result = run_json(temp.path(), &["workflow", flow.to_str().unwrap(), "topic=rust", "-o", "json"]);

    assert_eq!(result["topic"], "rust");
    assert_eq!(result["output_1"], json!({"output": "Echo: rust"}));
    assert_eq!(result["final"]["output"], r#"Echo: again {"output":"Echo: rust"}"#);

    let memory = run_json(temp.path(), &["mem", "-o", "json"]);
    assert_eq!(memory["output_1"], json!({"output": "Echo: rust"}));
    assert!(memory.get("final").is_some());

    let single = run_json(temp.path(), &["mem", "output_1", "-o", "json"]);
    assert_eq!(single, json!({"output": "Echo: rust"}));

    let missing = run_switchboard(temp.path(), &["mem", "nothing_here"]);
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("No memory entry named 'nothing_here'"));
}

#[test]
fn test_workflow_unknown_agent_aborts() {
    let temp = setup_test_env();
    let flow = temp.path().join("flow.json");
    fs::write(
        &flow,
        r#"{"input": {"steps": [
            {"agent": "echo_agent", "input": "one"},
            {"agent": "ghost_agent", "input": "two"},
            {"agent": "echo_agent", "input": "three"}
        ]}}"#,
    )
    .unwrap();

    let result = run_json(temp.path(), &["workflow", flow.to_str().unwrap(), "-o", "json"]);
    assert_eq!(result, json!({"error": "Unknown agent: ghost_agent"}));

    let memory = run_json(temp.path(), &["mem", "-o", "json"]);
    assert!(memory.get("output_1").is_some());
    assert!(memory.get("output_3").is_none());
}

#[test]
fn test_clear_mem() {
    let temp = setup_test_env();
    fs::write(temp.path().join("memory.json"), r#"{"last_input": "hi"}"#).unwrap();
    assert_eq!(run_json(temp.path(), &["mem", "-o", "json"]), json!({"last_input": "hi"}));

    let output = run_switchboard(temp.path(), &["clear-mem"]);
    assert!(output.status.success());
    assert_eq!(run_json(temp.path(), &["mem", "-o", "json"]), json!({}));
}

#[test]
fn test_corrupt_memory_starts_empty() {
    let temp = setup_test_env();
    fs::write(temp.path().join("memory.json"), "{ not json").unwrap();
    assert_eq!(run_json(temp.path(), &["mem", "-o", "json"]), json!({}));
}

#[test]
fn test_eval_writes_traces() {
    let temp = setup_test_env();
    let suite = temp.path().join("tests.yaml");
    fs::write(
        &suite,
        "tests:\n  - name: route email\n    input: write an email\n    expected_contains: could not determine\n",
    )
    .unwrap();

    let output = run_switchboard(temp.path(), &["eval", suite.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("1/1 passed"));

    let trace_path = temp.path().join("trace_outputs").join("route_email.json");
    let trace: Value = serde_json::from_str(&fs::read_to_string(trace_path).unwrap()).unwrap();
    assert_eq!(trace["passed"], true);
    assert_eq!(trace["test"]["name"], "route email");
    assert!(trace["timestamp"].is_string());
}

#[test]
fn test_missing_manifest_is_fatal() {
    let temp = setup_test_env();
    fs::remove_file(temp.path().join("agents_manifest.yaml")).unwrap();

    let output = run_switchboard(temp.path(), &["agents", "-o", "json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load agent registry"));
}

#[test]
fn test_completions() {
    let temp = setup_test_env();
    let output = run_switchboard(temp.path(), &["completions", "bash"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("switchboard"));
}
