use serde::{Deserialize, Serialize};

/// Assistant reply appended after every successful refinement
pub const ACKNOWLEDGEMENT: &str = "I've updated the question based on your instructions.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub fn acknowledgement() -> Self {
        Self::assistant(ACKNOWLEDGEMENT)
    }

    /// Assistant message reporting a failed refinement
    pub fn error(reason: &str) -> Self {
        Self::assistant(format!("Error: {}", reason))
    }

    pub fn is_error(&self) -> bool {
        self.role == Role::Assistant && self.content.starts_with("Error: ")
    }
}
