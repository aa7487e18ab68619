use mcp_cli_bridge::driver::CliReply;
use mcp_cli_bridge::mode::ServerMode;
use serde_json::{json, Value};

use super::test_helpers::{harness, harness_with, request, ScriptedDriver};

fn call_line(id: u64, tool: &str, arguments: &Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": tool, "arguments": arguments }
    })
    .to_string()
}

#[tokio::test]
async fn codex_generates_key_and_replays_history() {
    let h = harness(ServerMode::Codex);
    h.driver.push_text("struct Point;");
    h.driver.push_text("struct Point { x: i32 }");

    let first = request(&h.server, &call_line(1, "codex", &json!({"prompt": "make a struct"}))).await;
    let result = &first["result"];
    assert_eq!(result["content"], json!([{"type": "text", "text": "struct Point;"}]));
    let key = result["sessionKey"].as_str().expect("session key").to_owned();
    assert!(key.starts_with("codex_"));
    assert_eq!(result["metadata"]["historyLength"], 2);
    assert_eq!(result["metadata"]["model"], "default");

    let second = request(
        &h.server,
        &call_line(2, "codex", &json!({"prompt": "add a field", "sessionKey": key})),
    )
    .await;
    assert_eq!(second["result"]["sessionKey"], key.as_str());
    assert_eq!(second["result"]["metadata"]["historyLength"], 4);

    let invocations = h.driver.invocations();
    assert_eq!(invocations[0].prompt, "make a struct");
    assert_eq!(
        invocations[1].prompt,
        "Previous conversation:\n\nUser: make a struct\n\n---\n\nAssistant: struct Point;\n\n---\n\nCurrent request:\nadd a field"
    );
    assert_eq!(invocations[1].resume_token, None);
    assert_eq!(h.store.load(Some(key.as_str())).await.len(), 4);
}

#[tokio::test]
async fn timestamp_is_rfc3339() {
    let h = harness(ServerMode::Codex);
    let response = request(&h.server, &call_line(1, "codex", &json!({"prompt": "p"}))).await;
    let stamp = response["result"]["metadata"]["timestamp"].as_str().expect("timestamp");
    assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok(), "{stamp}");
}

#[tokio::test]
async fn alias_keys_are_accepted() {
    let h = harness(ServerMode::Codex);
    let response = request(
        &h.server,
        &call_line(1, "codex", &json!({"prompt": "p", "conversationId": "legacy-1"})),
    )
    .await;
    assert_eq!(response["result"]["sessionKey"], "legacy-1");
}

#[tokio::test]
async fn blank_session_key_is_treated_as_absent() {
    let h = harness(ServerMode::Codex);
    let response = request(
        &h.server,
        &call_line(1, "codex", &json!({"prompt": "p", "sessionKey": "  "})),
    )
    .await;
    let key = response["result"]["sessionKey"].as_str().expect("key");
    assert!(key.starts_with("codex_"));
}

#[tokio::test]
async fn caller_model_wins_over_default() {
    let h = harness_with(ScriptedDriver::new(ServerMode::Codex).with_default_model("o4-mini"));

    let defaulted = request(&h.server, &call_line(1, "codex", &json!({"prompt": "p"}))).await;
    assert_eq!(defaulted["result"]["metadata"]["model"], "o4-mini");

    let chosen = request(
        &h.server,
        &call_line(2, "codex", &json!({"prompt": "p", "model": "o3"})),
    )
    .await;
    assert_eq!(chosen["result"]["metadata"]["model"], "o3");

    let models: Vec<_> = h.driver.invocations().into_iter().map(|i| i.model).collect();
    assert_eq!(models, [Some("o4-mini".to_owned()), Some("o3".to_owned())]);
}

#[tokio::test]
async fn gemini_adopts_cli_session_id_when_caller_has_none() {
    let h = harness(ServerMode::Gemini);
    h.driver.push_reply(Ok(CliReply {
        text: "hello".into(),
        session_id: Some("cli-sess-42".into()),
        raw_records: vec![json!({"type": "init", "session_id": "cli-sess-42"})],
    }));

    let response = request(&h.server, &call_line(1, "gemini", &json!({"prompt": "hi"}))).await;
    let result = &response["result"];
    assert_eq!(result["sessionKey"], "cli-sess-42");
    assert_eq!(result["metadata"]["cliSessionId"], "cli-sess-42");
    assert!(result["metadata"].get("allMessages").is_none());
    assert_eq!(h.driver.invocations()[0].resume_token, None);
}

#[tokio::test]
async fn gemini_resumes_with_caller_key_and_sends_bare_prompt() {
    let h = harness(ServerMode::Gemini);
    h.driver.push_text("first");
    h.driver.push_text("second");

    request(
        &h.server,
        &call_line(1, "gemini", &json!({"prompt": "one", "sessionKey": "g-1"})),
    )
    .await;
    let response = request(
        &h.server,
        &call_line(2, "gemini", &json!({"prompt": "two", "sessionKey": "g-1", "sandbox": true})),
    )
    .await;

    assert_eq!(response["result"]["sessionKey"], "g-1");
    assert_eq!(response["result"]["metadata"]["historyLength"], 4);

    let second = &h.driver.invocations()[1];
    assert_eq!(second.prompt, "two");
    assert_eq!(second.resume_token.as_deref(), Some("g-1"));
    assert!(second.sandbox);
}

#[tokio::test]
async fn gemini_without_any_session_id_generates_key() {
    let h = harness(ServerMode::Gemini);
    let response = request(&h.server, &call_line(1, "gemini", &json!({"prompt": "hi"}))).await;
    assert!(response["result"]["sessionKey"]
        .as_str()
        .expect("key")
        .starts_with("gemini_"));
}

#[tokio::test]
async fn gemini_blank_cli_session_id_still_yields_fresh_key() {
    let h = harness(ServerMode::Gemini);
    h.driver.push_reply(Ok(CliReply {
        text: "Hi".into(),
        session_id: Some(String::new()),
        raw_records: Vec::new(),
    }));

    let response = request(&h.server, &call_line(1, "gemini", &json!({"prompt": "hello"}))).await;
    let key = response["result"]["sessionKey"].as_str().expect("key").to_owned();
    assert!(key.starts_with("gemini_"));
    assert_eq!(h.store.load(Some(key.as_str())).await.len(), 2);
}

#[tokio::test]
async fn return_all_messages_includes_raw_records() {
    let h = harness(ServerMode::Gemini);
    let records = vec![
        json!({"type": "init", "session_id": "s"}),
        json!({"type": "message", "role": "assistant", "content": "ok"}),
    ];
    h.driver.push_reply(Ok(CliReply {
        text: "ok".into(),
        session_id: Some("s".into()),
        raw_records: records.clone(),
    }));

    let response = request(
        &h.server,
        &call_line(1, "gemini", &json!({"prompt": "hi", "return_all_messages": true})),
    )
    .await;
    assert_eq!(response["result"]["metadata"]["allMessages"], Value::Array(records));
}

#[tokio::test]
async fn codex_ignores_cli_session_id_for_key() {
    let h = harness(ServerMode::Codex);
    h.driver.push_reply(Ok(CliReply {
        text: "ok".into(),
        session_id: Some("not-used".into()),
        raw_records: Vec::new(),
    }));
    let response = request(&h.server, &call_line(1, "codex", &json!({"prompt": "p"}))).await;
    assert_ne!(response["result"]["sessionKey"], "not-used");
}
