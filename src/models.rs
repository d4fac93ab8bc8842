//! Core data types that flow through the advisor pipeline.

/// One fragment of grounding text, labeled with the source it came from.
///
/// Items are created once at corpus load time and never mutated. The source
/// identifier is human-readable (a URL, a relative file path, or an inline
/// block id), suffixed with a fragment index when a long body was split.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub source: String,
    pub text: String,
}

impl ContentItem {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used when rendering history into a prompt ("Role: text" lines).
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One role-tagged message in the conversation sequence.
///
/// Turns are appended in strict chronological order and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}
