use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::deserializers::{deserialize_optional_timestamp, deserialize_optional_uuid, deserialize_uuid};
use super::question::parse_question_record;
use super::{SchemaError, from_value, parse_array};
use crate::models::{GenerationResult, QuestionKind, QuestionRecord, RecentSession, SourceType};

/// Session group of `GET /api/questions/recent`
#[derive(Debug, Deserialize)]
struct RawRecentSession {
    #[serde(deserialize_with = "deserialize_uuid")]
    session_id: String,
    question_type: QuestionKind,
    source_type: SourceType,
    quantity: usize,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    questions: Value,
}

/// Body of the document and similar-question generation endpoints
#[derive(Debug, Deserialize)]
struct RawGenerationResult {
    #[serde(deserialize_with = "deserialize_uuid")]
    session_id: String,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    document_id: Option<String>,
    #[serde(default)]
    questions: Value,
}

/// Parse the dashboard's recent-session list (newest first, as sent)
pub fn parse_recent_sessions(value: Value) -> Result<Vec<RecentSession>, SchemaError> {
    parse_array(value, "sessions", |item| {
        let raw: RawRecentSession = from_value(item, "session")?;
        Ok(RecentSession {
            session_id: raw.session_id,
            kind: raw.question_type,
            source_type: raw.source_type,
            quantity: raw.quantity,
            created_at: raw.created_at,
            questions: parse_array(raw.questions, "questions", parse_question_record)?,
        })
    })
}

/// Parse `GET /api/questions/session/{session_id}`
pub fn parse_session_questions(value: Value) -> Result<Vec<QuestionRecord>, SchemaError> {
    parse_array(value, "questions", parse_question_record)
}

pub fn parse_generation_result(value: Value) -> Result<GenerationResult, SchemaError> {
    let raw: RawGenerationResult = from_value(value, "generation result")?;
    let questions = parse_array(raw.questions, "questions", parse_question_record)?;
    if questions.is_empty() {
        return Err(SchemaError::invalid("questions", "no questions were generated"));
    }

    Ok(GenerationResult { session_id: raw.session_id, document_id: raw.document_id, questions })
}
