//! Transport loop over an in-memory duplex pipe.

use std::time::Duration;

use mcp_cli_bridge::mcp::transport::serve;
use mcp_cli_bridge::mode::ServerMode;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use super::test_helpers::{config_in, server};

async fn exchange(input: &str) -> Vec<Value> {
    let dir = tempfile::tempdir().expect("tempdir");
    let bridge = server(config_in(dir.path()), ServerMode::Codex);

    let (client, server_io) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_io);
    let (mut client_read, mut client_write) = tokio::io::split(client);

    let serving = tokio::spawn(serve(bridge, server_read, server_write, CancellationToken::new()));

    client_write.write_all(input.as_bytes()).await.expect("write");
    client_write.shutdown().await.expect("shutdown");

    tokio::time::timeout(Duration::from_secs(10), serving)
        .await
        .expect("serve finished")
        .expect("serve task")
        .expect("serve ok");

    let mut raw = String::new();
    client_read.read_to_string(&mut raw).await.expect("read");
    raw.lines()
        .map(|line| serde_json::from_str(line).expect("response is json"))
        .collect()
}

#[tokio::test]
async fn responses_follow_request_order() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#, "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#, "\n",
        r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#, "\n",
    );
    let responses = exchange(input).await;

    let ids: Vec<_> = responses.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, [Value::from(1), Value::from(2), Value::from(3)]);
    assert_eq!(responses[1]["result"]["tools"][0]["name"], "codex");
}

#[tokio::test]
async fn bad_line_does_not_end_the_session() {
    let input = concat!(
        "this is not json\n",
        r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#, "\n",
    );
    let responses = exchange(input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[1]["id"], 7);
}

#[tokio::test]
async fn final_line_without_newline_is_answered() {
    let responses = exchange(r#"{"jsonrpc":"2.0","id":"tail","method":"ping"}"#).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], "tail");
}

#[tokio::test]
async fn cancellation_stops_an_idle_server() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bridge = server(config_in(dir.path()), ServerMode::Gemini);
    let (_client, server_io) = tokio::io::duplex(1024);
    let (server_read, server_write) = tokio::io::split(server_io);
    let ct = CancellationToken::new();

    let serving = tokio::spawn(serve(bridge, server_read, server_write, ct.clone()));
    tokio::time::sleep(Duration::from_millis(50)).await;
    ct.cancel();

    tokio::time::timeout(Duration::from_secs(5), serving)
        .await
        .expect("stopped after cancel")
        .expect("serve task")
        .expect("serve ok");
}
