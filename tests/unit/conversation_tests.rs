use mcp_cli_bridge::models::conversation::{ConversationHistory, ConversationTurn, Role};
use serde_json::json;

#[test]
fn record_exchange_appends_user_then_assistant() {
    let mut history = ConversationHistory::new();
    history.record_exchange("question", "answer");
    history.record_exchange("follow-up", "more");

    assert_eq!(history.len(), 4);
    assert_eq!(
        history.turns(),
        [
            ConversationTurn::user("question"),
            ConversationTurn::assistant("answer"),
            ConversationTurn::user("follow-up"),
            ConversationTurn::assistant("more"),
        ]
    );
}

#[test]
fn history_serializes_as_bare_array() {
    let mut history = ConversationHistory::new();
    history.record_exchange("hi", "hello");
    let value = serde_json::to_value(&history).expect("serialize");
    assert_eq!(
        value,
        json!([
            {"role": "user", "content": "hi"},
            {"role": "assistant", "content": "hello"}
        ])
    );
}

#[test]
fn unknown_role_is_rejected() {
    let raw = r#"[{"role": "system", "content": "x"}]"#;
    assert!(serde_json::from_str::<ConversationHistory>(raw).is_err());
}

#[test]
fn role_labels_match_replay_format() {
    assert_eq!(Role::User.label(), "User");
    assert_eq!(Role::Assistant.label(), "Assistant");
}

#[test]
fn content_is_kept_verbatim() {
    let mut history = ConversationHistory::new();
    history.record_exchange("  spaced\n", "");
    let turns: Vec<_> = history.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(turns, ["  spaced\n", ""]);
}
