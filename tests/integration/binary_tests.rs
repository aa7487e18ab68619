//! End-to-end run of the compiled server binary.

use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::Value;

fn run_server(mode: &str, input: &str) -> (Vec<Value>, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut child = Command::new(env!("CARGO_BIN_EXE_mcp-cli-bridge"))
        .args(["--mode", mode, "--config"])
        .arg(dir.path().join("absent.toml"))
        .arg("--context-root")
        .arg(dir.path())
        .env("RUST_LOG", "info")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn server");

    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("write requests");

    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success(), "server exited with {}", output.status);

    let responses = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout carries only json"))
        .collect();
    (responses, String::from_utf8_lossy(&output.stderr).into_owned())
}

#[test]
fn handshake_over_real_stdio() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-06-18"}}"#, "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#, "\n",
    );
    let (responses, stderr) = run_server("gemini", input);

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "gemini-mcp-server");
    assert_eq!(responses[1]["result"]["tools"][0]["name"], "gemini");
    assert!(stderr.contains("using default configuration"), "stderr: {stderr}");
}

#[test]
fn log_file_is_written_under_context_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut child = Command::new(env!("CARGO_BIN_EXE_mcp-cli-bridge"))
        .args(["--mode", "codex", "--context-root"])
        .arg(dir.path())
        .args(["--config"])
        .arg(dir.path().join("absent.toml"))
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn server");
    drop(child.stdin.take());
    assert!(child.wait().expect("wait").success());

    let log = std::fs::read_to_string(dir.path().join("codex").join("mcp-server.log"))
        .expect("log file");
    assert!(log.contains("codex-mcp-server ready"));
}
