//! Conversation turns and the ordered history stored per session key.

use serde::{Deserialize, Serialize};

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Prompt text supplied by the tool caller.
    User,
    /// Answer text produced by the backing CLI.
    Assistant,
}

impl Role {
    /// Label used when replaying history into a prompt.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// A single history entry. Never mutated after it is appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    /// Who produced the content.
    pub role: Role,
    /// Verbatim text of the turn.
    pub content: String,
}

impl ConversationTurn {
    /// Build a user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Build an assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered conversation history, oldest turn first.
///
/// Serialized as a bare JSON array of turns so stored records stay readable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ConversationHistory(Vec<ConversationTurn>);

impl ConversationHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one completed exchange: the user prompt followed by its answer.
    ///
    /// Both entries are pushed together so a stored history always holds an
    /// even number of turns.
    pub fn record_exchange(&mut self, prompt: impl Into<String>, answer: impl Into<String>) {
        self.0.push(ConversationTurn::user(prompt));
        self.0.push(ConversationTurn::assistant(answer));
    }

    /// Number of stored turns (two per exchange).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no turns are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate turns oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, ConversationTurn> {
        self.0.iter()
    }

    /// Borrow the turns as a slice.
    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.0
    }
}

impl From<Vec<ConversationTurn>> for ConversationHistory {
    fn from(turns: Vec<ConversationTurn>) -> Self {
        Self(turns)
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a ConversationTurn;
    type IntoIter = std::slice::Iter<'a, ConversationTurn>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
