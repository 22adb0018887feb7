//! Session credentials for the question backend
//!
//! Credentials are an explicit value: the CLI resolves them once (environment override first,
//! then the on-disk store) and hands them to [`crate::api::StudioClient`]. Nothing else in the
//! crate reads or caches a session.

pub mod store;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::User;

pub use store::{CREDENTIALS_FILE_NAME, CredentialStore};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not logged in; run `question-studio login` or set QSTUDIO_TOKEN")]
    NotLoggedIn,

    #[error("credential store error: {0}")]
    Store(String),
}

/// Bearer token plus the user it was issued to, when known
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default)]
    pub user: Option<User>,
}

impl Credentials {
    pub fn from_token(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), user: None }
    }
}

// Keep tokens out of debug logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Result of a signup; `credentials` is `None` while email confirmation is pending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupOutcome {
    pub message: String,
    pub user: Option<User>,
    pub credentials: Option<Credentials>,
}

/// Where the active token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Environment,
    File,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Environment => f.write_str("QSTUDIO_TOKEN"),
            TokenSource::File => f.write_str("credentials file"),
        }
    }
}
