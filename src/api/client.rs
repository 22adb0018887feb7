//! Async client for the question backend's `/api` routes

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde_json::json;
use tracing::{debug, info};

use super::error::ApiError;
use super::http::{check_response, read_json};
use super::validation;
use crate::auth::{Credentials, SignupOutcome};
use crate::models::{
    Difficulty, GenerationResult, QuestionKind, QuestionRecord, RecentSession, RefinementEvent,
    User,
};
use crate::parsers::{
    parse_generation_result, parse_login_response, parse_question_record,
    parse_recent_sessions, parse_refinement_response, parse_session_questions,
    parse_signup_response, parse_user, parse_version_history,
};
use crate::timeline::{Timeline, build_initial};
use crate::utils::{UploadKind, encode_path_segment, upload_mime_type, validate_file_size};

// Only connecting is bounded; model-backed requests wait as long as the backend takes
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Parameters of a similar-question request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarRequest {
    pub instruction: String,
    pub difficulty: Difficulty,
    pub quantity: u32,
}

/// Client bound to one backend origin and, optionally, one set of credentials
#[derive(Debug, Clone)]
pub struct StudioClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl StudioClient {
    /// `base_url` is the backend origin, e.g. `http://localhost:8000`
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("question-studio/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string(), credentials })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/api{}", self.base_url, path);
        debug!(%method, %url, "backend request");
        let builder = self.http.request(method, url);
        match &self.credentials {
            Some(creds) => builder.bearer_auth(&creds.access_token),
            None => builder,
        }
    }

    /// `GET /api/questions/{id}`
    pub async fn fetch_question(&self, question_id: &str) -> Result<QuestionRecord, ApiError> {
        let path = format!("/questions/{}", encode_path_segment(question_id));
        let resp = self.request(Method::GET, &path).send().await?;
        let value = match read_json(resp, "question", "Failed to load question").await {
            Err(ApiError::Api { status: 404, .. }) => {
                return Err(ApiError::NotFound(question_id.to_string()));
            }
            other => other?,
        };
        // The backend answers 200 with `null` for ids it does not know
        if value.is_null() {
            return Err(ApiError::NotFound(question_id.to_string()));
        }
        Ok(parse_question_record(value)?)
    }

    /// `GET /api/questions/{id}/versions`, in server order (newest first)
    pub async fn fetch_versions(&self, question_id: &str) -> Result<Vec<RefinementEvent>, ApiError> {
        let path = format!("/questions/{}/versions", encode_path_segment(question_id));
        let resp = self.request(Method::GET, &path).send().await?;
        let value = read_json(resp, "version history", "Failed to load version history").await?;
        Ok(parse_version_history(value, question_id)?)
    }

    /// `POST /api/refine/{id}`
    pub async fn refine(
        &self,
        question_id: &str,
        instruction: &str,
    ) -> Result<RefinementEvent, ApiError> {
        let instruction = validation::refinement_instruction(instruction)?;
        let path = format!("/refine/{}", encode_path_segment(question_id));
        let resp = self
            .request(Method::POST, &path)
            .json(&json!({ "instruction": instruction }))
            .send()
            .await?;
        let value = read_json(resp, "refinement response", "Refinement failed").await?;
        let event = parse_refinement_response(value, instruction)?;
        info!(question_id, version = event.version, "question refined");
        Ok(event)
    }

    /// Fetch a question and its history concurrently and build the studio timeline
    pub async fn load_timeline(&self, question_id: &str) -> Result<Timeline, ApiError> {
        let (base, events) =
            tokio::try_join!(self.fetch_question(question_id), self.fetch_versions(question_id))?;
        Ok(build_initial(&base, &events))
    }

    /// `GET /api/questions/recent`
    pub async fn recent_sessions(&self) -> Result<Vec<RecentSession>, ApiError> {
        let resp = self.request(Method::GET, "/questions/recent").send().await?;
        let value = read_json(resp, "recent sessions", "Failed to load questions").await?;
        Ok(parse_recent_sessions(value)?)
    }

    /// `GET /api/questions/session/{session_id}`
    pub async fn session_questions(&self, session_id: &str) -> Result<Vec<QuestionRecord>, ApiError> {
        let path = format!("/questions/session/{}", encode_path_segment(session_id));
        let resp = self.request(Method::GET, &path).send().await?;
        let value = read_json(resp, "session questions", "Failed to load questions").await?;
        Ok(parse_session_questions(value)?)
    }

    /// `POST /api/documents/generate` with a PDF upload
    pub async fn generate_from_document(
        &self,
        pdf: &Path,
        kind: QuestionKind,
        quantity: u32,
    ) -> Result<GenerationResult, ApiError> {
        let quantity = validation::document_quantity(quantity)?;
        let form = Form::new()
            .part("file", upload_part(pdf, UploadKind::Document)?)
            .text("question_type", kind.wire_name())
            .text("quantity", quantity.to_string());

        let resp = self.request(Method::POST, "/documents/generate").multipart(form).send().await?;
        let value = read_json(resp, "generation result", "Failed to generate questions").await?;
        let result = parse_generation_result(value)?;
        info!(session_id = %result.session_id, count = result.questions.len(), "document questions generated");
        Ok(result)
    }

    /// `POST /api/similar/generate` with a seed image
    pub async fn generate_similar(
        &self,
        image: &Path,
        request: &SimilarRequest,
    ) -> Result<GenerationResult, ApiError> {
        let instruction = validation::similar_instruction(&request.instruction)?;
        let quantity = validation::similar_quantity(request.quantity)?;
        let form = Form::new()
            .part("image", upload_part(image, UploadKind::Image)?)
            .text("instruction", instruction.to_string())
            .text("difficulty", request.difficulty.as_str())
            .text("quantity", quantity.to_string());

        let resp = self.request(Method::POST, "/similar/generate").multipart(form).send().await?;
        let value = read_json(resp, "generation result", "Failed to generate questions").await?;
        let result = parse_generation_result(value)?;
        info!(session_id = %result.session_id, count = result.questions.len(), "similar questions generated");
        Ok(result)
    }

    /// `POST /api/auth/login`
    pub async fn login(&self, email: &str, password: &str) -> Result<Credentials, ApiError> {
        let email = validation::email(email)?;
        let password = validation::password(password)?;
        let resp = self
            .request(Method::POST, "/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let value = read_json(resp, "login response", "Login failed").await?;
        Ok(parse_login_response(value)?)
    }

    /// `POST /api/auth/signup`
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignupOutcome, ApiError> {
        let email = validation::email(email)?;
        let password = validation::password(password)?;
        let display_name = validation::display_name(display_name)?;
        let resp = self
            .request(Method::POST, "/auth/signup")
            .json(&json!({ "email": email, "password": password, "display_name": display_name }))
            .send()
            .await?;
        let value = read_json(resp, "signup response", "Signup failed").await?;
        Ok(parse_signup_response(value)?)
    }

    /// `POST /api/auth/logout`
    pub async fn logout(&self) -> Result<(), ApiError> {
        let resp = self.request(Method::POST, "/auth/logout").send().await?;
        check_response(resp, "Logout failed").await?;
        Ok(())
    }

    /// `GET /api/auth/me`
    pub async fn me(&self) -> Result<User, ApiError> {
        let resp = self.request(Method::GET, "/auth/me").send().await?;
        let value = read_json(resp, "user", "Failed to fetch user").await?;
        Ok(parse_user(value)?)
    }
}

/// Read an upload into a multipart part after checking its type and size
fn upload_part(path: &Path, kind: UploadKind) -> Result<Part, ApiError> {
    let upload_error = |e: anyhow::Error| ApiError::Upload(format!("{:#}", e));

    let mime = upload_mime_type(path, kind).map_err(upload_error)?;
    let mut file = File::open(path)
        .map_err(|e| ApiError::Upload(format!("Failed to open {}: {}", path.display(), e)))?;
    validate_file_size(&file, path).map_err(upload_error)?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ApiError::Upload(format!("Failed to read {}: {}", path.display(), e)))?;
    if bytes.is_empty() {
        return Err(ApiError::Upload(format!("File is empty: {}", path.display())));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Part::bytes(bytes).file_name(file_name).mime_str(mime)?)
}
