//! Argument escaping for display.
//!
//! Processes are started with an explicit argument vector, so prompts reach
//! the CLI unmodified. On Windows the standard library applies `cmd.exe`
//! quoting itself when the program is a `.cmd`/`.bat` script, so arguments
//! must never be pre-quoted here. This module only renders an argument
//! vector as one readable shell-style line for logs.

use std::path::Path;

/// Backslash-escape the characters a shell would otherwise reinterpret:
/// backslash, double quote, newline, carriage return, tab, single quote.
#[must_use]
pub fn escape_special(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len());
    for c in arg.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\'' => out.push_str("\\'"),
            other => out.push(other),
        }
    }
    out
}

/// Render one argument: bare when it is a single plain word, otherwise
/// escaped and wrapped in double quotes.
#[must_use]
pub fn display_arg(arg: &str) -> String {
    let plain = !arg.is_empty()
        && !arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\\' | '"' | '\''));
    if plain {
        arg.to_owned()
    } else {
        format!("\"{}\"", escape_special(arg))
    }
}

/// Render `program` and `args` as a single line.
#[must_use]
pub fn command_line(program: &Path, args: &[String]) -> String {
    std::iter::once(display_arg(&program.to_string_lossy()))
        .chain(args.iter().map(|arg| display_arg(arg)))
        .collect::<Vec<_>>()
        .join(" ")
}
