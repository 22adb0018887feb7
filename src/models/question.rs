use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "mcq")]
    SingleSelect,
    #[serde(rename = "open")]
    OpenEnded,
}

impl QuestionKind {
    /// Name used by the backend API (`mcq` / `open`)
    pub fn wire_name(self) -> &'static str {
        match self {
            QuestionKind::SingleSelect => "mcq",
            QuestionKind::OpenEnded => "open",
        }
    }

    /// Badge text shown on question cards
    pub fn display_name(self) -> &'static str {
        match self {
            QuestionKind::SingleSelect => "MULTIPLE CHOICE",
            QuestionKind::OpenEnded => "OPEN ENDED",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mcq" => Ok(QuestionKind::SingleSelect),
            "open" => Ok(QuestionKind::OpenEnded),
            other => Err(format!("unknown question type '{}' (expected mcq or open)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Document,
    Similarity,
}

impl SourceType {
    pub fn display_name(self) -> &'static str {
        match self {
            SourceType::Document => "PDF WORKSPACE",
            SourceType::Similarity => "SIMILAR QUESTIONS",
        }
    }
}

/// Question body shared by stored questions, refinement results and version history.
///
/// `options` is present if and only if `kind` is [`QuestionKind::SingleSelect`];
/// the boundary parser rejects payloads that break this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionContent {
    pub kind: QuestionKind,
    pub text: String,
    pub options: Option<BTreeMap<String, String>>,
    pub correct_answer: Option<String>,
    pub explanation: String,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub tags: Option<serde_json::Map<String, serde_json::Value>>,
    pub confidence_score: Option<f64>,
}

/// A question as stored by the backend (base question of a studio timeline,
/// entries of a generation session)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub session_id: Option<String>,
    pub source_type: Option<SourceType>,
    pub content: QuestionContent,
    pub created_at: Option<DateTime<Utc>>,
}

/// Immutable content of a question at one version of its revision history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSnapshot {
    pub id: String,
    pub kind: QuestionKind,
    pub text: String,
    pub options: Option<BTreeMap<String, String>>,
    pub correct_answer: Option<String>,
    pub explanation: String,
    pub version_label: String,
    pub version: u32,
    pub subject: String,
    pub topic: String,
}
