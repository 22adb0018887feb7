use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::deserializers::{deserialize_optional_timestamp, deserialize_uuid, deserialize_version};
use super::question::RawQuestionContent;
use super::{SchemaError, from_value, parse_array};
use crate::models::{Instruction, RefinementEvent};

/// Row of `GET /api/questions/{id}/versions`
#[derive(Debug, Deserialize)]
struct RawVersion {
    #[serde(deserialize_with = "deserialize_uuid")]
    question_id: String,
    #[serde(deserialize_with = "deserialize_version")]
    version: u32,
    #[serde(default)]
    instruction: Option<String>,
    content: RawQuestionContent,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/refine/{id}`
#[derive(Debug, Deserialize)]
struct RawRefinementResponse {
    #[serde(deserialize_with = "deserialize_uuid")]
    question_id: String,
    #[serde(deserialize_with = "deserialize_version")]
    version: u32,
    question: RawQuestionContent,
}

/// Parse the version history of `question_id`
///
/// The backend returns rows newest first; order is left untouched here because the
/// timeline builder sorts. A row belonging to another question is a schema error.
pub fn parse_version_history(
    value: Value,
    question_id: &str,
) -> Result<Vec<RefinementEvent>, SchemaError> {
    parse_array(value, "versions", |item| {
        let raw: RawVersion = from_value(item, "version")?;
        if !raw.question_id.eq_ignore_ascii_case(question_id) {
            return Err(SchemaError::invalid(
                "question_id",
                format!("version belongs to {}, expected {}", raw.question_id, question_id),
            ));
        }

        Ok(RefinementEvent {
            question_id: raw.question_id,
            version: raw.version,
            instruction: Instruction::from_raw(raw.instruction.as_deref()),
            content: raw.content.validate()?,
            created_at: raw.created_at,
        })
    })
}

/// Parse the response to a refinement request into the event it produced
pub fn parse_refinement_response(
    value: Value,
    instruction: &str,
) -> Result<RefinementEvent, SchemaError> {
    let raw: RawRefinementResponse = from_value(value, "refinement response")?;

    Ok(RefinementEvent {
        question_id: raw.question_id,
        version: raw.version,
        instruction: Instruction::User(instruction.to_string()),
        content: raw.question.validate()?,
        created_at: None,
    })
}
