use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::question::QuestionContent;

/// Instruction text the backend stores on the version row created at first refinement
pub const SEED_INSTRUCTION: &str = "__seed__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Initial generation, not a user refinement (sentinel, missing or blank instruction)
    Seed,
    User(String),
}

impl Instruction {
    /// Classify a raw instruction as reported by the version-history endpoint
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(text) if !text.trim().is_empty() && text != SEED_INSTRUCTION => {
                Instruction::User(text.to_string())
            }
            _ => Instruction::Seed,
        }
    }

    pub fn user_text(&self) -> Option<&str> {
        match self {
            Instruction::Seed => None,
            Instruction::User(text) => Some(text),
        }
    }
}

/// One server-reported version of a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementEvent {
    pub question_id: String,
    pub version: u32,
    pub instruction: Instruction,
    pub content: QuestionContent,
    pub created_at: Option<DateTime<Utc>>,
}
