//! Backend client error types.

use thiserror::Error;

use crate::parsers::SchemaError;

/// Errors that can occur when talking to the question backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS, ...).
    #[error("could not reach the backend: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    ///
    /// Displays only the message, which is the backend's `detail` or an
    /// operation-specific fallback, so it can be shown to users as is.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The backend returned 429 Too Many Requests.
    ///
    /// Displays the backend's `detail` when it sent one.
    #[error("{}", rate_limit_message(.detail, .retry_after_secs))]
    RateLimited { retry_after_secs: u64, detail: Option<String> },

    /// The response body does not match the expected schema.
    #[error("unexpected response from the backend: {0}")]
    Schema(#[from] SchemaError),

    /// The question does not exist or is not visible to the current user.
    #[error("question {0} not found")]
    NotFound(String),

    /// A request argument was rejected before anything was sent.
    #[error("{0}")]
    Validation(String),

    /// An upload file could not be read.
    #[error("{0}")]
    Upload(String),
}

fn rate_limit_message(detail: &Option<String>, retry_after_secs: &u64) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("rate limited; retry after {}s", retry_after_secs),
    }
}

impl ApiError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// True when logging in again may help
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
