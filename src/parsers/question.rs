use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::deserializers::{
    deserialize_blank_as_none, deserialize_optional_timestamp, deserialize_optional_uuid,
    deserialize_uuid,
};
use super::{SchemaError, from_value};
use crate::models::{QuestionContent, QuestionKind, QuestionRecord, SourceType};

/// Question body exactly as the backend sends it
#[derive(Debug, Deserialize)]
pub(crate) struct RawQuestionContent {
    question_type: String,
    #[serde(default)]
    question_text: Option<String>,
    #[serde(default)]
    options: Option<BTreeMap<String, String>>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    correct_answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    explanation: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    subject: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    topic: Option<String>,
    #[serde(default)]
    tags: Option<Map<String, Value>>,
    #[serde(default)]
    confidence_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawQuestionRecord {
    #[serde(deserialize_with = "deserialize_uuid")]
    id: String,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    session_id: Option<String>,
    #[serde(default)]
    source_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    content: RawQuestionContent,
}

impl RawQuestionContent {
    pub(crate) fn validate(self) -> Result<QuestionContent, SchemaError> {
        let kind = self
            .question_type
            .parse::<QuestionKind>()
            .map_err(|e| SchemaError::invalid("question_type", e))?;

        let text = self
            .question_text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SchemaError::invalid("question_text", "must not be empty"))?;

        // An empty option map carries no information; treat it as absent
        let options = self.options.filter(|o| !o.is_empty());
        match (kind, &options) {
            (QuestionKind::SingleSelect, None) => {
                return Err(SchemaError::invalid("options", "multiple-choice question has no options"));
            }
            (QuestionKind::OpenEnded, Some(_)) => {
                return Err(SchemaError::invalid("options", "open-ended question carries options"));
            }
            _ => {}
        }

        let correct_answer = self.correct_answer.map(|a| a.trim().to_string());
        if let (Some(options), Some(answer)) = (&options, &correct_answer)
            && !options.contains_key(answer)
        {
            return Err(SchemaError::invalid(
                "correct_answer",
                format!("'{}' is not one of the options", answer),
            ));
        }

        if let Some(score) = self.confidence_score
            && !(0.0..=1.0).contains(&score)
        {
            return Err(SchemaError::invalid(
                "confidence_score",
                format!("{} is outside [0, 1]", score),
            ));
        }

        Ok(QuestionContent {
            kind,
            text,
            options,
            correct_answer,
            explanation: self.explanation.unwrap_or_default(),
            subject: self.subject,
            topic: self.topic,
            tags: self.tags,
            confidence_score: self.confidence_score,
        })
    }
}

fn parse_source_type(raw: &str) -> Result<SourceType, SchemaError> {
    match raw {
        "document" => Ok(SourceType::Document),
        "similarity" => Ok(SourceType::Similarity),
        other => Err(SchemaError::invalid("source_type", format!("unknown source '{}'", other))),
    }
}

/// Parse and validate a bare question body (`question` of a refinement response,
/// `content` of a version row)
pub fn parse_question_content(value: Value) -> Result<QuestionContent, SchemaError> {
    from_value::<RawQuestionContent>(value, "question content")?.validate()
}

/// Parse and validate a stored question as returned by `GET /api/questions/{id}`
pub fn parse_question_record(value: Value) -> Result<QuestionRecord, SchemaError> {
    let raw: RawQuestionRecord = from_value(value, "question")?;
    let source_type = raw.source_type.as_deref().map(parse_source_type).transpose()?;

    Ok(QuestionRecord {
        id: raw.id,
        session_id: raw.session_id,
        source_type,
        content: raw.content.validate()?,
        created_at: raw.created_at,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn mcq_record() -> Value {
        json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "user_id": "550e8400-e29b-41d4-a716-446655440009",
            "session_id": "550e8400-e29b-41d4-a716-446655440001",
            "document_id": null,
            "source_type": "document",
            "question_type": "mcq",
            "question_text": "Which planet is largest?",
            "options": {"A": "Mars", "B": "Jupiter", "C": "Venus", "D": "Earth"},
            "correct_answer": "B",
            "explanation": "Jupiter is the largest planet in the solar system.",
            "tags": {"bloom": "remember"},
            "confidence_score": 0.9,
            "created_at": "2025-01-15T10:30:00+00:00"
        })
    }

    #[test]
    fn test_parse_mcq_record() {
        let record = parse_question_record(mcq_record()).unwrap();
        assert_eq!(record.id, "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(record.source_type, Some(SourceType::Document));
        assert_eq!(record.content.kind, QuestionKind::SingleSelect);
        assert_eq!(record.content.options.as_ref().unwrap().len(), 4);
        assert_eq!(record.content.correct_answer.as_deref(), Some("B"));
        assert!(record.content.subject.is_none());
        assert!(record.created_at.is_some());
    }

    #[test]
    fn test_parse_open_record_minimal() {
        let value = json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "question_type": "open",
            "question_text": "2+2=?"
        });
        let record = parse_question_record(value).unwrap();
        assert_eq!(record.content.kind, QuestionKind::OpenEnded);
        assert!(record.content.options.is_none());
        assert_eq!(record.content.explanation, "");
        assert!(record.session_id.is_none());
    }

    #[test]
    fn test_open_question_with_empty_options_is_accepted() {
        let value = json!({
            "question_type": "open",
            "question_text": "Explain entropy.",
            "options": {}
        });
        let content = parse_question_content(value).unwrap();
        assert!(content.options.is_none());
    }

    #[test]
    fn test_mcq_without_options_rejected() {
        let value = json!({
            "question_type": "mcq",
            "question_text": "Pick one",
            "options": null,
            "correct_answer": "A"
        });
        let err = parse_question_content(value).unwrap_err();
        assert_eq!(err.to_string(), "invalid options: multiple-choice question has no options");
    }

    #[test]
    fn test_open_question_with_options_rejected() {
        let value = json!({
            "question_type": "open",
            "question_text": "Explain",
            "options": {"A": "x"}
        });
        assert!(parse_question_content(value).is_err());
    }

    #[test]
    fn test_correct_answer_must_name_option() {
        let mut value = mcq_record();
        value["correct_answer"] = json!("E");
        let err = parse_question_record(value).unwrap_err();
        assert!(err.to_string().contains("'E' is not one of the options"));
    }

    #[test]
    fn test_unknown_question_type_rejected() {
        let mut value = mcq_record();
        value["question_type"] = json!("essay");
        let err = parse_question_record(value).unwrap_err();
        assert!(err.to_string().starts_with("invalid question_type"));
    }

    #[test]
    fn test_blank_question_text_rejected() {
        let mut value = mcq_record();
        value["question_text"] = json!("   ");
        assert!(parse_question_record(value).is_err());
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let mut value = mcq_record();
        value["confidence_score"] = json!(1.5);
        assert!(parse_question_record(value).is_err());
    }

    #[test]
    fn test_invalid_id_rejected() {
        let mut value = mcq_record();
        value["id"] = json!("q1");
        let err = parse_question_record(value).unwrap_err();
        assert!(matches!(err, SchemaError::Json { what: "question", .. }));
    }

    #[test]
    fn test_unknown_source_type_rejected() {
        let mut value = mcq_record();
        value["source_type"] = json!("upload");
        assert!(parse_question_record(value).is_err());
    }

    #[test]
    fn test_subject_and_topic_kept_when_present() {
        let mut value = mcq_record();
        value["subject"] = json!("Astronomy");
        value["topic"] = json!("  ");
        let record = parse_question_record(value).unwrap();
        assert_eq!(record.content.subject.as_deref(), Some("Astronomy"));
        assert!(record.content.topic.is_none());
    }
}
