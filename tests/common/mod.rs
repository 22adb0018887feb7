//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use serde_json::{Value, json};

pub const QID: &str = "550e8400-e29b-41d4-a716-446655440000";
pub const SESSION_ID: &str = "550e8400-e29b-41d4-a716-446655440001";
pub const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440009";

/// Open-ended question row as stored by the backend
pub fn open_question_json(id: &str, text: &str) -> Value {
    json!({
        "id": id,
        "user_id": USER_ID,
        "session_id": SESSION_ID,
        "document_id": null,
        "source_type": "document",
        "question_type": "open",
        "question_text": text,
        "options": null,
        "correct_answer": "4",
        "explanation": "Two and two make four.",
        "tags": null,
        "confidence_score": null,
        "created_at": "2025-01-15T10:30:00+00:00"
    })
}

/// Multiple-choice question row as stored by the backend
pub fn mcq_question_json(id: &str, text: &str) -> Value {
    json!({
        "id": id,
        "user_id": USER_ID,
        "session_id": SESSION_ID,
        "source_type": "similarity",
        "question_type": "mcq",
        "question_text": text,
        "options": {"A": "Mars", "B": "Jupiter", "C": "Venus", "D": "Earth"},
        "correct_answer": "B",
        "explanation": "Jupiter is the largest planet.",
        "subject": "Astronomy",
        "topic": "Planets",
        "tags": {"bloom": "remember"},
        "confidence_score": 0.9,
        "created_at": "2025-01-15T10:30:00+00:00"
    })
}

/// Row of the version history; `instruction` may be the `__seed__` sentinel
pub fn version_json(version: u32, instruction: &str, text: &str) -> Value {
    json!({
        "id": format!("550e8400-e29b-41d4-a716-4466554401{:02}", version),
        "question_id": QID,
        "user_id": USER_ID,
        "version": version,
        "instruction": instruction,
        "content": {
            "question_type": "open",
            "question_text": text,
            "options": null,
            "correct_answer": "4",
            "explanation": "Two and two make four.",
            "tags": null,
            "confidence_score": null
        },
        "created_at": "2025-01-15T10:30:00.123456+00:00"
    })
}

/// Body of a successful refinement
pub fn refine_json(version: u32, text: &str) -> Value {
    json!({
        "question_id": QID,
        "version": version,
        "question": {
            "question_type": "open",
            "question_text": text,
            "options": null,
            "correct_answer": "4",
            "explanation": "Two and two make four.",
            "tags": null,
            "confidence_score": null
        }
    })
}

pub fn generation_json(questions: Vec<Value>) -> Value {
    json!({
        "session_id": SESSION_ID,
        "document_id": "550e8400-e29b-41d4-a716-446655440002",
        "questions": questions
    })
}

pub fn recent_sessions_json() -> Value {
    json!([{
        "session_id": SESSION_ID,
        "question_type": "open",
        "quantity": 1,
        "created_at": "2025-01-15T10:30:00+00:00",
        "source_type": "document",
        "questions": [open_question_json(QID, "2+2=?")]
    }])
}

pub fn login_json(token: &str) -> Value {
    json!({
        "message": "Login successful",
        "session": {"access_token": token, "refresh_token": "r", "expires_in": 3600},
        "user": {
            "id": USER_ID,
            "email": "ada@example.com",
            "user_metadata": {"display_name": "Ada"}
        }
    })
}

/// Canned answer for one method and path
#[derive(Debug, Clone)]
pub struct Route {
    method: String,
    path: String,
    status: u16,
    body: String,
    headers: Vec<(String, String)>,
    delay: Duration,
}

impl Route {
    pub fn json(method: &str, path: &str, status: u16, body: Value) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            status,
            body: body.to_string(),
            headers: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    /// FastAPI-style error: `{"detail": "..."}`
    pub fn detail(method: &str, path: &str, status: u16, detail: &str) -> Self {
        Self::json(method, path, status, json!({ "detail": detail }))
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Hold the answer back, like a backend waiting on a slow model
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// What the fake backend saw
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// HTTP server on a random local port answering from a fixed route table
///
/// Unknown routes get a 404 with a `detail` body. The server thread stops when the value is
/// dropped.
pub struct FakeBackend {
    url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FakeBackend {
    pub fn start(routes: Vec<Route>) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("Failed to bind fake backend");
        let port = server.server_addr().to_ip().map(|a| a.port()).expect("Fake backend has no port");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let requests = Arc::clone(&requests);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                        Ok(Some(request)) => request,
                        Ok(None) => continue,
                        Err(_) => break,
                    };

                    let header = |name: &'static str| {
                        request
                            .headers()
                            .iter()
                            .find(|h| h.field.equiv(name))
                            .map(|h| h.value.as_str().to_string())
                    };
                    let method = request.method().to_string().to_uppercase();
                    let path = request.url().split('?').next().unwrap_or_default().to_string();
                    let authorization = header("Authorization");
                    let content_type = header("Content-Type");

                    let mut raw = Vec::new();
                    let _ = request.as_reader().read_to_end(&mut raw);
                    requests.lock().unwrap().push(RecordedRequest {
                        method: method.clone(),
                        path: path.clone(),
                        authorization,
                        content_type,
                        body: String::from_utf8_lossy(&raw).into_owned(),
                    });

                    let route = routes.iter().find(|r| r.method == method && r.path == path);
                    let (status, body, headers, delay) = match route {
                        Some(r) => (r.status, r.body.clone(), r.headers.clone(), r.delay),
                        None => (404, json!({"detail": "Not Found"}).to_string(), Vec::new(), Duration::ZERO),
                    };
                    std::thread::sleep(delay);

                    let mut response = tiny_http::Response::from_string(body)
                        .with_status_code(status)
                        .with_header(
                            tiny_http::Header::from_bytes("Content-Type", "application/json")
                                .unwrap(),
                        );
                    for (name, value) in headers {
                        response = response.with_header(
                            tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes())
                                .unwrap(),
                        );
                    }
                    let _ = request.respond(response);
                }
            })
        };

        Self { url: format!("http://127.0.0.1:{}", port), requests, stop, handle: Some(handle) }
    }

    /// Origin to hand to the client (no `/api` suffix)
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
