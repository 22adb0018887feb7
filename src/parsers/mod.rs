//! Boundary parsers for backend JSON payloads
//!
//! # Error Handling Strategy
//!
//! Unlike a line-oriented log parser, a studio page cannot render half a question, so this
//! module **fails closed**:
//!
//! - **Raw records first**: Payloads are deserialized into private raw structs whose fields
//!   mirror the backend's loose shapes (nullable, optional, stringly typed).
//!
//! - **Validation second**: Raw records are converted into the strong types of
//!   [`crate::models`]. Any schema mismatch (bad UUID, unknown question type, options on an
//!   open-ended question, out-of-range confidence, ...) becomes a [`SchemaError`] and the whole
//!   payload is rejected. Callers surface it as a page-level error.
//!
//! - **Defaults only for presentation fields**: Blank subject, topic, explanation and correct
//!   answer are treated as absent rather than rejected, so partial data still renders.

pub mod account;
pub mod deserializers;
pub mod history;
pub mod question;
pub mod session;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use account::{parse_login_response, parse_signup_response, parse_user};
pub use history::{parse_refinement_response, parse_version_history};
pub use question::{parse_question_content, parse_question_record};
pub use session::{parse_generation_result, parse_recent_sessions, parse_session_questions};

/// A backend payload that does not match the expected schema
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("malformed {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("{what} entry {index}: {source}")]
    Entry {
        what: &'static str,
        index: usize,
        #[source]
        source: Box<SchemaError>,
    },
}

impl SchemaError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SchemaError::Invalid { field, reason: reason.into() }
    }
}

pub(crate) fn from_value<T: DeserializeOwned>(
    value: Value,
    what: &'static str,
) -> Result<T, SchemaError> {
    serde_json::from_value(value).map_err(|source| SchemaError::Json { what, source })
}

/// Parse every element of a JSON array with `parse`, reporting the index of the first failure
pub(crate) fn parse_array<T>(
    value: Value,
    what: &'static str,
    mut parse: impl FnMut(Value) -> Result<T, SchemaError>,
) -> Result<Vec<T>, SchemaError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(SchemaError::invalid(what, format!("expected a list, got {}", kind_of(&other))));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            parse(item).map_err(|e| SchemaError::Entry { what, index, source: Box::new(e) })
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
