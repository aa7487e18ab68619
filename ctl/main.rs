#![forbid(unsafe_code)]

//! `bridge-ctl`: local companion for exercising `mcp-cli-bridge`.
//!
//! Spawns the server, writes a short scripted JSON-RPC conversation to its
//! stdin, closes stdin, and reports the responses. Useful for checking a
//! config file or a CLI installation without an MCP client.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command as Process, Stdio};

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Debug, Parser)]
#[command(
    name = "bridge-ctl",
    about = "Local CLI for mcp-cli-bridge",
    version,
    long_about = None
)]
struct Cli {
    /// Server executable. Defaults to `mcp-cli-bridge` next to this binary.
    #[arg(long)]
    server: Option<PathBuf>,

    /// Backing CLI mode passed to the server.
    #[arg(long, value_enum, default_value_t = CtlMode::Codex)]
    mode: CtlMode,

    /// Configuration file passed to the server.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Mode selector, mirrored locally because this binary talks to the server
/// only over its wire protocol.
#[derive(Debug, Copy, Clone, Eq, PartialEq, clap::ValueEnum)]
enum CtlMode {
    /// `codex` tool.
    Codex,
    /// `gemini` tool.
    Gemini,
}

impl CtlMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Codex => "codex",
            Self::Gemini => "gemini",
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the tool definition the server advertises.
    List,

    /// Run one tool call and print the answer.
    Call {
        /// Prompt text.
        prompt: String,
        /// Session key from an earlier call.
        #[arg(long)]
        session_key: Option<String>,
        /// Model override.
        #[arg(long)]
        model: Option<String>,
    },

    /// Check the handshake, tool listing, and error handling without
    /// invoking the backing CLI.
    Smoke,
}

impl Cli {
    fn server_path(&self) -> PathBuf {
        if let Some(path) = &self.server {
            return path.clone();
        }
        let name = format!("mcp-cli-bridge{}", std::env::consts::EXE_SUFFIX);
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

fn main() {
    let args = Cli::parse();
    let tool = args.mode.as_str();

    let mut requests = vec![
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": { "protocolVersion": "2025-06-18", "capabilities": {} }
        })
        .to_string(),
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string(),
    ];
    match &args.command {
        Command::List => {
            requests.push(json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }).to_string());
        }
        Command::Call {
            prompt,
            session_key,
            model,
        } => {
            let mut arguments = json!({ "prompt": prompt });
            if let Some(key) = session_key {
                arguments["sessionKey"] = Value::String(key.clone());
            }
            if let Some(m) = model {
                arguments["model"] = Value::String(m.clone());
            }
            requests.push(
                json!({
                    "jsonrpc": "2.0",
                    "id": 2,
                    "method": "tools/call",
                    "params": { "name": tool, "arguments": arguments }
                })
                .to_string(),
            );
        }
        Command::Smoke => {
            requests.push(json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }).to_string());
            requests.push(
                json!({
                    "jsonrpc": "2.0",
                    "id": 3,
                    "method": "tools/call",
                    "params": { "name": tool, "arguments": {} }
                })
                .to_string(),
            );
            requests.push("{bad json".to_owned());
            requests.push(json!({ "jsonrpc": "2.0", "id": 4, "method": "ping" }).to_string());
        }
    }

    let responses = match exchange(&args, &requests) {
        Ok(responses) => responses,
        Err(err) => {
            eprintln!("Failed to run server: {err}");
            eprintln!("Is {} built and executable?", args.server_path().display());
            std::process::exit(1);
        }
    };

    let outcome = match &args.command {
        Command::List => report_list(&responses),
        Command::Call { .. } => report_call(&responses),
        Command::Smoke => report_smoke(&responses, tool),
    };
    if let Err(message) = outcome {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

fn report_list(responses: &[Value]) -> Result<(), String> {
    let tools = find_response(responses, 2)
        .map(result_of)
        .transpose()?
        .and_then(|r| r.get("tools"))
        .ok_or("no tools/list response")?;
    println!("{}", serde_json::to_string_pretty(tools).unwrap_or_default());
    Ok(())
}

fn report_call(responses: &[Value]) -> Result<(), String> {
    let result = result_of(find_response(responses, 2).ok_or("no tools/call response")?)?;
    if let Some(text) = result.pointer("/content/0/text").and_then(Value::as_str) {
        println!("{text}");
    }
    if let Some(key) = result.get("sessionKey").and_then(Value::as_str) {
        eprintln!("sessionKey: {key}");
    }
    Ok(())
}

fn report_smoke(responses: &[Value], tool: &str) -> Result<(), String> {
    let init = result_of(find_response(responses, 1).ok_or("no initialize response")?)?;
    let server = init
        .pointer("/serverInfo/name")
        .and_then(Value::as_str)
        .unwrap_or("server");
    println!("initialize: {server}");

    let list = result_of(find_response(responses, 2).ok_or("no tools/list response")?)?;
    let names: Vec<&str> = list
        .get("tools")
        .and_then(Value::as_array)
        .map(|tools| tools.iter().filter_map(|t| t.get("name")?.as_str()).collect())
        .unwrap_or_default();
    if names != [tool] {
        return Err(format!("expected exactly the {tool} tool, got {names:?}"));
    }
    println!("tools/list: {tool}");

    expect_error(find_response(responses, 3), -32602, "missing prompt")?;
    let malformed = responses
        .iter()
        .find(|r| r.get("id").is_some_and(Value::is_null));
    expect_error(malformed, -32700, "malformed line")?;

    result_of(find_response(responses, 4).ok_or("no ping response")?)?;
    println!("ping: ok");
    println!("OK");
    Ok(())
}

fn expect_error(response: Option<&Value>, code: i64, label: &str) -> Result<(), String> {
    let actual = response
        .and_then(|r| r.pointer("/error/code"))
        .and_then(Value::as_i64);
    if actual == Some(code) {
        println!("{label}: {code}");
        Ok(())
    } else {
        Err(format!("{label}: expected error {code}, got {actual:?}"))
    }
}

fn find_response(responses: &[Value], id: u64) -> Option<&Value> {
    responses
        .iter()
        .find(|r| r.get("id").and_then(Value::as_u64) == Some(id))
}

fn result_of(response: &Value) -> Result<&Value, String> {
    if let Some(message) = response.pointer("/error/message").and_then(Value::as_str) {
        return Err(message.to_owned());
    }
    response.get("result").ok_or_else(|| "response has no result".to_owned())
}

/// Spawn the server, send every request line, close stdin, and collect the
/// response lines.
fn exchange(
    args: &Cli,
    requests: &[String],
) -> std::result::Result<Vec<Value>, Box<dyn std::error::Error>> {
    let mut command = Process::new(args.server_path());
    command.arg("--mode").arg(args.mode.as_str());
    if let Some(config) = &args.config {
        command.arg("--config").arg(config);
    }
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        for request in requests {
            stdin.write_all(request.as_bytes())?;
            stdin.write_all(b"\n")?;
        }
        stdin.flush()?;
    }

    let output = child.wait_with_output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let responses = stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(serde_json::from_str)
        .collect::<std::result::Result<Vec<Value>, _>>()?;
    Ok(responses)
}
