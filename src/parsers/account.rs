use serde::Deserialize;
use serde_json::Value;

use super::{SchemaError, from_value};
use crate::auth::{Credentials, SignupOutcome};
use crate::models::User;

#[derive(Debug, Default, Deserialize)]
struct RawUserMetadata {
    #[serde(default)]
    display_name: Option<String>,
}

/// User object as returned by the auth provider
#[derive(Debug, Deserialize)]
struct RawUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<RawUserMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawSession {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct RawAuthResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    session: Option<RawSession>,
    #[serde(default)]
    user: Option<RawUser>,
}

impl RawUser {
    fn into_user(self) -> Result<User, SchemaError> {
        if self.id.trim().is_empty() {
            return Err(SchemaError::invalid("user.id", "must not be empty"));
        }
        let display_name = self
            .user_metadata
            .and_then(|m| m.display_name)
            .filter(|name| !name.trim().is_empty());

        Ok(User { id: self.id, email: self.email.unwrap_or_default(), display_name })
    }
}

/// Parse `GET /api/auth/me`
pub fn parse_user(value: Value) -> Result<User, SchemaError> {
    from_value::<RawUser>(value, "user")?.into_user()
}

/// Parse `POST /api/auth/login`; a successful login always carries a session token
pub fn parse_login_response(value: Value) -> Result<Credentials, SchemaError> {
    let raw: RawAuthResponse = from_value(value, "login response")?;
    let session = raw
        .session
        .filter(|s| !s.access_token.trim().is_empty())
        .ok_or_else(|| SchemaError::invalid("session", "login response has no access token"))?;

    Ok(Credentials {
        access_token: session.access_token,
        user: raw.user.map(RawUser::into_user).transpose()?,
    })
}

/// Parse `POST /api/auth/signup`; the session is absent when email confirmation is pending
pub fn parse_signup_response(value: Value) -> Result<SignupOutcome, SchemaError> {
    let raw: RawAuthResponse = from_value(value, "signup response")?;
    let user = raw.user.map(RawUser::into_user).transpose()?;
    let credentials = raw
        .session
        .filter(|s| !s.access_token.trim().is_empty())
        .map(|s| Credentials { access_token: s.access_token, user: user.clone() });

    Ok(SignupOutcome {
        message: raw.message.unwrap_or_else(|| "Account created successfully".to_string()),
        user,
        credentials,
    })
}
