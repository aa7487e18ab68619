use std::path::Path;

use mcp_cli_bridge::process::escape::{command_line, display_arg, escape_special};

#[test]
fn escapes_every_special_character() {
    assert_eq!(
        escape_special("a\\b\"c\nd\re\tf'g"),
        "a\\\\b\\\"c\\nd\\re\\tf\\'g"
    );
}

#[test]
fn plain_text_is_unchanged() {
    assert_eq!(escape_special("hello world $HOME"), "hello world $HOME");
}

#[test]
fn plain_words_display_bare() {
    assert_eq!(display_arg("--sandbox"), "--sandbox");
    assert_eq!(display_arg("approval_policy=never"), "approval_policy=never");
}

#[test]
fn spaced_or_special_args_display_quoted() {
    assert_eq!(display_arg("say \"hi\""), "\"say \\\"hi\\\"\"");
    assert_eq!(display_arg("line1\nline2"), "\"line1\\nline2\"");
    assert_eq!(display_arg(""), "\"\"");
}

#[test]
fn command_line_joins_program_and_args() {
    let args = vec!["exec".to_owned(), "fix the bug".to_owned()];
    assert_eq!(
        command_line(Path::new("codex"), &args),
        "codex exec \"fix the bug\""
    );
}
