use mcp_cli_bridge::mode::ServerMode;

use super::test_helpers::{error_code, harness, request};

#[tokio::test]
async fn wrong_tool_name_is_unknown_tool() {
    let h = harness(ServerMode::Codex);
    let response = request(
        &h.server,
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"gemini","arguments":{"prompt":"x"}}}"#,
    )
    .await;
    assert_eq!(error_code(&response), -32601);
    assert_eq!(response["error"]["message"], "Unknown tool: gemini");
    assert!(h.driver.invocations().is_empty());
}

#[tokio::test]
async fn missing_params_or_name_is_invalid_params() {
    let h = harness(ServerMode::Codex);
    for line in [
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call"}"#,
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"arguments":{"prompt":"x"}}}"#,
    ] {
        let response = request(&h.server, line).await;
        assert_eq!(error_code(&response), -32602, "line: {line}");
    }
    assert!(h.driver.invocations().is_empty());
}

#[tokio::test]
async fn missing_or_empty_prompt_is_invalid_params() {
    let h = harness(ServerMode::Gemini);
    for arguments in [r"{}", r#"{"prompt":""}"#, r#"{"prompt":null}"#] {
        let line = format!(
            r#"{{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{{"name":"gemini","arguments":{arguments}}}}}"#
        );
        let response = request(&h.server, &line).await;
        assert_eq!(error_code(&response), -32602, "arguments: {arguments}");
        assert_eq!(response["error"]["message"], "Invalid params: prompt is required");
    }

    let no_arguments = request(
        &h.server,
        r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"gemini"}}"#,
    )
    .await;
    assert_eq!(error_code(&no_arguments), -32602);
    assert!(h.driver.invocations().is_empty());
}

#[tokio::test]
async fn whitespace_prompt_is_forwarded_unchanged() {
    let h = harness(ServerMode::Gemini);
    let response = request(
        &h.server,
        r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"gemini","arguments":{"prompt":"   "}}}"#,
    )
    .await;
    assert!(response.get("error").is_none(), "{response}");
    assert_eq!(h.driver.invocations()[0].prompt, "   ");
}

#[tokio::test]
async fn wrongly_typed_arguments_are_invalid_params() {
    let h = harness(ServerMode::Gemini);
    for arguments in [
        r#""just a string""#,
        r#"{"prompt":"x","sandbox":"yes"}"#,
        r#"{"prompt":"x","sessionKey":12}"#,
    ] {
        let line = format!(
            r#"{{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{{"name":"gemini","arguments":{arguments}}}}}"#
        );
        let response = request(&h.server, &line).await;
        assert_eq!(error_code(&response), -32602, "arguments: {arguments}");
    }
    assert!(h.driver.invocations().is_empty());
}

#[tokio::test]
async fn driver_failure_is_internal_error_and_server_keeps_serving() {
    let h = harness(ServerMode::Codex);
    h.driver.push_reply(Err(mcp_cli_bridge::AppError::Timeout(
        "codex timed out after 300s".into(),
    )));

    let failed = request(
        &h.server,
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"codex","arguments":{"prompt":"slow","sessionKey":"k1"}}}"#,
    )
    .await;
    assert_eq!(error_code(&failed), -32603);
    assert_eq!(failed["error"]["message"], "timeout: codex timed out after 300s");
    assert!(h.store.load(Some("k1")).await.is_empty());

    let ping = request(&h.server, r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#).await;
    assert!(ping.get("error").is_none());
}
