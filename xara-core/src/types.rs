use crate::feedback::{QueryResolved, Satisfaction};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque session token sent with every agent call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Bot,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,

    // Bot-only metadata.
    pub intent: Option<String>,
    pub suggestions: Option<Vec<String>>,

    #[serde(default)]
    pub feedback_submitted: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            intent: None,
            suggestions: None,
            feedback_submitted: false,
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: content.into(),
            intent: None,
            suggestions: None,
            feedback_submitted: false,
        }
    }

    pub fn with_intent(mut self, intent: Option<String>) -> Self {
        self.intent = intent.filter(|i| !i.trim().is_empty());
        self
    }

    pub fn with_suggestions(mut self, suggestions: Option<Vec<String>>) -> Self {
        self.suggestions = suggestions.filter(|s| !s.is_empty());
        self
    }

    pub fn is_bot(&self) -> bool {
        self.role == Role::Bot
    }

    pub fn suggestion(&self, index: usize) -> Option<&str> {
        self.suggestions
            .as_ref()
            .and_then(|s| s.get(index))
            .map(String::as_str)
    }
}

/// Inline per-message feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Thumb {
    Up,
    Down,
}

impl Thumb {
    pub fn resolution(self) -> QueryResolved {
        match self {
            Thumb::Up => QueryResolved::Yes,
            Thumb::Down => QueryResolved::No,
        }
    }

    pub fn satisfaction(self) -> Satisfaction {
        match self {
            Thumb::Up => Satisfaction::MAX,
            Thumb::Down => Satisfaction::MIN,
        }
    }
}
