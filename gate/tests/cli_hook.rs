//! CLI tests for the `gate` binary.
//!
//! Spawns the binary against a temp project root and verifies stdout payloads
//! and exit codes.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use gate::exit_codes;
use gate::io::config::{GateConfig, JudgeConfig, config_path, write_config};
use serde_json::Value;

fn gate(root: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_gate"))
        .arg("--root")
        .arg(root)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn gate");
    if let Some(input) = stdin {
        child
            .stdin
            .take()
            .expect("stdin")
            .write_all(input.as_bytes())
            .expect("write stdin");
    }
    child.wait_with_output().expect("wait gate")
}

fn todo_write(todos: &str) -> String {
    format!(
        r#"{{"session_id": "s1", "hook_event_name": "PreToolUse", "tool_name": "TodoWrite", "tool_input": {{"todos": {todos}}}}}"#
    )
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

#[test]
fn hook_blocks_first_completion_then_lets_resubmission_through() {
    let temp = tempfile::tempdir().expect("tempdir");
    let event = todo_write(r#"[{"content": "Write tests", "status": "completed", "activeForm": "Writing tests"}]"#);

    let first = gate(temp.path(), &["hook"], Some(&event));
    assert_eq!(first.status.code(), Some(exit_codes::OK));
    let body = stdout_json(&first);
    assert_eq!(body["decision"], "block");
    let reason = body["reason"].as_str().expect("reason");
    assert!(reason.starts_with("Confirmation required"));
    assert!(reason.contains("\"Write tests\""));

    let second = gate(temp.path(), &["hook"], Some(&event));
    assert_eq!(second.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout_json(&second), serde_json::json!({}));

    let status = gate(temp.path(), &["status"], None);
    assert_eq!(stdout_json(&status)["attempts"]["Write tests"], 2);
}

#[test]
fn hook_ignores_other_tools() {
    let temp = tempfile::tempdir().expect("tempdir");
    let event = r#"{"hook_event_name": "PreToolUse", "tool_name": "Bash", "tool_input": {"command": "ls"}}"#;

    let output = gate(temp.path(), &["hook"], Some(event));

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout_json(&output), serde_json::json!({}));
    assert!(!temp.path().join(".gate").exists());
}

#[test]
fn session_start_clears_attempts() {
    let temp = tempfile::tempdir().expect("tempdir");
    let event = todo_write(r#"[{"content": "a", "status": "completed"}]"#);
    gate(temp.path(), &["hook"], Some(&event));

    let output = gate(
        temp.path(),
        &["hook"],
        Some(r#"{"hook_event_name": "SessionStart", "session_id": "s2"}"#),
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let status = gate(temp.path(), &["status"], None);
    assert_eq!(stdout_json(&status)["attempts"], serde_json::json!({}));
}

#[test]
fn hook_dry_run_writes_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let event = todo_write(r#"[{"content": "a", "status": "completed"}]"#);

    let output = gate(temp.path(), &["hook", "--dry-run"], Some(&event));

    assert_eq!(stdout_json(&output)["decision"], "block");
    assert!(!temp.path().join(".gate").join("state").exists());
}

#[test]
fn check_exit_codes_follow_decision() {
    let temp = tempfile::tempdir().expect("tempdir");
    let todos = temp.path().join("todos.json");
    fs::write(&todos, r#"{"todos": [{"content": "a", "status": "completed"}]}"#)
        .expect("write todos");
    let todos_arg = todos.to_str().expect("utf-8 path");

    let first = gate(temp.path(), &["check", "--todos", todos_arg], None);
    assert_eq!(first.status.code(), Some(exit_codes::BLOCKED));
    let body = stdout_json(&first);
    assert_eq!(body["decision"], "block");
    assert_eq!(body["kind"], "confirmation_required");

    let second = gate(temp.path(), &["check", "--todos", todos_arg], None);
    assert_eq!(second.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout_json(&second)["decision"], "allow");
}

#[test]
fn accept_drops_named_counters() {
    let temp = tempfile::tempdir().expect("tempdir");
    let event = todo_write(
        r#"[{"content": "a", "status": "completed"}, {"content": "b", "status": "completed"}]"#,
    );
    gate(temp.path(), &["hook"], Some(&event));

    let output = gate(temp.path(), &["accept", "a"], None);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "a");

    let status = gate(temp.path(), &["status"], None);
    assert_eq!(stdout_json(&status)["attempts"], serde_json::json!({"b": 1}));
}

#[test]
fn invalid_config_exits_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = config_path(temp.path());
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, "max_retry_attempts = 0\n").expect("write config");
    let event = todo_write(r#"[{"content": "a", "status": "completed"}]"#);

    let output = gate(temp.path(), &["hook"], Some(&event));

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("max_retry_attempts"));
}

#[test]
fn init_writes_default_config() {
    let temp = tempfile::tempdir().expect("tempdir");

    let output = gate(temp.path(), &["init"], None);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let raw = fs::read_to_string(config_path(temp.path())).expect("config");
    let cfg: GateConfig = toml::from_str(&raw).expect("parse config");
    assert_eq!(cfg, GateConfig::default());
}

#[cfg(unix)]
#[test]
fn hook_consults_configured_judge() {
    let temp = tempfile::tempdir().expect("tempdir");
    let cfg = GateConfig {
        judge: JudgeConfig {
            command: vec![
                "sh".to_string(),
                "-c".to_string(),
                r#"cat >/dev/null; echo '{"approve": false, "reason": "no evidence"}'"#.to_string(),
            ],
            ..JudgeConfig::default()
        },
        ..GateConfig::default()
    };
    write_config(&config_path(temp.path()), &cfg).expect("write config");

    let done = todo_write(r#"[{"content": "a", "status": "completed"}]"#);
    gate(temp.path(), &["hook"], Some(&done));
    gate(temp.path(), &["hook"], Some(&todo_write("[]")));
    let output = gate(temp.path(), &["hook"], Some(&done));

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let body = stdout_json(&output);
    assert_eq!(body["decision"], "block");
    assert_eq!(body["reason"], "Completion rejected: no evidence");
}
