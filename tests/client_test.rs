/// Integration tests for the backend client against a local fake backend
mod common;

use std::fs;
use std::time::Duration;

use common::{
    FakeBackend, QID, Route, SESSION_ID, generation_json, login_json, mcq_question_json,
    open_question_json, recent_sessions_json, refine_json, version_json,
};
use pretty_assertions::assert_eq;
use question_studio::api::SimilarRequest;
use question_studio::auth::Credentials;
use question_studio::models::{ChatMessage, Difficulty, QuestionKind, SourceType};
use question_studio::{ApiError, StudioClient};
use serde_json::{Value, json};
use tempfile::TempDir;

fn question_path() -> String {
    format!("/api/questions/{}", QID)
}

fn versions_path() -> String {
    format!("/api/questions/{}/versions", QID)
}

fn refine_path() -> String {
    format!("/api/refine/{}", QID)
}

fn client(backend: &FakeBackend) -> StudioClient {
    StudioClient::new(backend.url(), Some(Credentials::from_token("tok-123"))).unwrap()
}

#[tokio::test]
async fn test_load_timeline_sends_bearer_token() {
    let backend = FakeBackend::start(vec![
        Route::json("GET", &question_path(), 200, open_question_json(QID, "2+2=?")),
        Route::json(
            "GET",
            &versions_path(),
            200,
            json!([version_json(2, "harder", "v2"), version_json(1, "__seed__", "v1")]),
        ),
    ]);

    let timeline = client(&backend).load_timeline(QID).await.unwrap();

    let versions: Vec<u32> = timeline.snapshots().iter().map(|s| s.version).collect();
    assert_eq!(versions, vec![0, 1, 2]);
    assert_eq!(timeline.messages().len(), 2);

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    for request in requests {
        assert_eq!(request.method, "GET");
        assert_eq!(request.authorization.as_deref(), Some("Bearer tok-123"));
    }
}

#[tokio::test]
async fn test_fetch_question_parses_mcq() {
    let backend = FakeBackend::start(vec![Route::json(
        "GET",
        &question_path(),
        200,
        mcq_question_json(QID, "Which planet is largest?"),
    )]);

    let record = client(&backend).fetch_question(QID).await.unwrap();

    assert_eq!(record.id, QID);
    assert_eq!(record.source_type, Some(SourceType::Similarity));
    assert_eq!(record.content.kind, QuestionKind::SingleSelect);
    assert_eq!(record.content.correct_answer.as_deref(), Some("B"));
    assert_eq!(record.content.options.as_ref().map(|o| o.len()), Some(4));
}

#[tokio::test]
async fn test_null_question_is_not_found() {
    let backend = FakeBackend::start(vec![Route::json("GET", &question_path(), 200, Value::Null)]);

    let err = client(&backend).fetch_question(QID).await.unwrap_err();

    assert!(matches!(err, ApiError::NotFound(ref id) if id == QID));
    assert_eq!(err.to_string(), format!("question {} not found", QID));
}

#[tokio::test]
async fn test_missing_route_is_not_found() {
    let backend = FakeBackend::start(vec![]);
    let err = client(&backend).fetch_question(QID).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_failed_history_fails_the_timeline() {
    let backend = FakeBackend::start(vec![
        Route::json("GET", &question_path(), 200, open_question_json(QID, "2+2=?")),
        Route::detail("GET", &versions_path(), 500, "database unavailable"),
    ]);

    let err = client(&backend).load_timeline(QID).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "database unavailable");
}

#[tokio::test]
async fn test_malformed_history_is_a_schema_error() {
    let backend = FakeBackend::start(vec![
        Route::json("GET", &question_path(), 200, open_question_json(QID, "2+2=?")),
        Route::json("GET", &versions_path(), 200, json!({"versions": "nope"})),
    ]);

    let err = client(&backend).load_timeline(QID).await.unwrap_err();
    assert!(matches!(err, ApiError::Schema(_)));
}

#[tokio::test]
async fn test_refine_posts_trimmed_instruction() {
    let backend =
        FakeBackend::start(vec![Route::json("POST", &refine_path(), 200, refine_json(3, "Harder"))]);

    let event = client(&backend).refine(QID, "  make it harder  ").await.unwrap();

    assert_eq!(event.version, 3);
    assert_eq!(event.content.text, "Harder");

    let requests = backend.requests_to(&refine_path());
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body, json!({"instruction": "make it harder"}));
}

#[tokio::test]
async fn test_slow_refinement_is_awaited() {
    let backend = FakeBackend::start(vec![
        Route::json("POST", &refine_path(), 200, refine_json(1, "Slow answer"))
            .with_delay(Duration::from_secs(2)),
    ]);

    let event = client(&backend).refine(QID, "take your time").await.unwrap();

    assert_eq!(event.version, 1);
    assert_eq!(event.content.text, "Slow answer");
}

#[tokio::test]
async fn test_refine_error_uses_backend_detail() {
    let backend = FakeBackend::start(vec![Route::detail(
        "POST",
        &refine_path(),
        400,
        "Instruction is too vague",
    )]);

    let err = client(&backend).refine(QID, "fix it").await.unwrap_err();

    assert!(matches!(err, ApiError::Api { status: 400, .. }));
    assert_eq!(err.to_string(), "Instruction is too vague");
}

#[tokio::test]
async fn test_refine_error_without_detail_uses_fallback() {
    let backend = FakeBackend::start(vec![Route::json("POST", &refine_path(), 502, json!({}))]);
    let err = client(&backend).refine(QID, "fix it").await.unwrap_err();
    assert_eq!(err.to_string(), "Refinement failed");
}

#[tokio::test]
async fn test_validation_error_list_is_joined() {
    let backend = FakeBackend::start(vec![Route::json(
        "POST",
        &refine_path(),
        422,
        json!({"detail": [
            {"loc": ["body", "instruction"], "msg": "field required", "type": "missing"},
            {"loc": ["body"], "msg": "bad body", "type": "value_error"}
        ]}),
    )]);

    let err = client(&backend).refine(QID, "fix it").await.unwrap_err();
    assert_eq!(err.to_string(), "field required; bad body");
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let backend = FakeBackend::start(vec![
        Route::detail("POST", &refine_path(), 429, "slow down").with_header("Retry-After", "7"),
    ]);

    let err = client(&backend).refine(QID, "fix it").await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimited { retry_after_secs: 7, .. }));
    assert_eq!(err.to_string(), "slow down");
}

#[tokio::test]
async fn test_rate_limit_without_detail_mentions_retry() {
    let backend = FakeBackend::start(vec![Route::json("POST", &refine_path(), 429, json!({}))]);

    let err = client(&backend).refine(QID, "fix it").await.unwrap_err();

    assert!(matches!(err, ApiError::RateLimited { retry_after_secs: 60, detail: None }));
    assert_eq!(err.to_string(), "rate limited; retry after 60s");
}

#[tokio::test]
async fn test_rate_limited_refinement_shows_backend_detail_in_chat() {
    let mut routes = vec![
        Route::json("GET", &question_path(), 200, open_question_json(QID, "2+2=?")),
        Route::json("GET", &versions_path(), 200, json!([])),
    ];
    routes.push(Route::detail("POST", &refine_path(), 429, "rate limited"));
    let backend = FakeBackend::start(routes);
    let studio = client(&backend);

    let mut timeline = studio.load_timeline(QID).await.unwrap();
    let pending = timeline.begin_refinement("add option").unwrap();
    let outcome = studio.refine(pending.question_id(), pending.instruction()).await;
    timeline.settle(pending, outcome);

    assert_eq!(timeline.snapshots().len(), 1);
    assert_eq!(
        timeline.messages(),
        &[ChatMessage::user("add option"), ChatMessage::assistant("Error: rate limited")]
    );
}

#[tokio::test]
async fn test_short_instruction_is_rejected_before_sending() {
    let backend = FakeBackend::start(vec![]);

    let err = client(&backend).refine(QID, " x ").await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_recent_sessions() {
    let backend = FakeBackend::start(vec![Route::json(
        "GET",
        "/api/questions/recent",
        200,
        recent_sessions_json(),
    )]);

    let sessions = client(&backend).recent_sessions().await.unwrap();

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, SESSION_ID);
    assert_eq!(sessions[0].source_type, SourceType::Document);
    assert_eq!(sessions[0].questions.len(), 1);
}

#[tokio::test]
async fn test_session_questions() {
    let path = format!("/api/questions/session/{}", SESSION_ID);
    let backend = FakeBackend::start(vec![Route::json(
        "GET",
        &path,
        200,
        json!([open_question_json(QID, "2+2=?")]),
    )]);

    let questions = client(&backend).session_questions(SESSION_ID).await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].content.text, "2+2=?");
}

#[tokio::test]
async fn test_generate_from_document_uploads_multipart() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("exam.pdf");
    fs::write(&pdf, b"%PDF-1.4 fake").unwrap();

    let backend = FakeBackend::start(vec![Route::json(
        "POST",
        "/api/documents/generate",
        200,
        generation_json(vec![open_question_json(QID, "2+2=?")]),
    )]);

    let result = client(&backend)
        .generate_from_document(&pdf, QuestionKind::OpenEnded, 5)
        .await
        .unwrap();

    assert_eq!(result.session_id, SESSION_ID);
    assert_eq!(result.questions.len(), 1);

    let requests = backend.requests_to("/api/documents/generate");
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.content_type.as_deref().unwrap_or_default().starts_with("multipart/form-data"));
    assert!(request.body.contains(r#"name="file"; filename="exam.pdf""#));
    assert!(request.body.contains("application/pdf"));
    assert!(request.body.contains("%PDF-1.4 fake"));
    assert!(request.body.contains(r#"name="question_type""#));
    assert!(request.body.contains("open"));
}

#[tokio::test]
async fn test_generate_from_document_rejects_wrong_extension() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, b"hello").unwrap();
    let backend = FakeBackend::start(vec![]);

    let err = client(&backend)
        .generate_from_document(&notes, QuestionKind::SingleSelect, 5)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Upload(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_generate_similar_sends_difficulty() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("question.png");
    fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

    let backend = FakeBackend::start(vec![Route::json(
        "POST",
        "/api/similar/generate",
        200,
        generation_json(vec![mcq_question_json(QID, "Which planet is largest?")]),
    )]);
    let request = SimilarRequest {
        instruction: "Same topic, new numbers".to_string(),
        difficulty: Difficulty::Hard,
        quantity: 3,
    };

    let result = client(&backend).generate_similar(&image, &request).await.unwrap();

    assert_eq!(result.questions[0].content.kind, QuestionKind::SingleSelect);
    let body = &backend.requests_to("/api/similar/generate")[0].body;
    assert!(body.contains(r#"name="image"; filename="question.png""#));
    assert!(body.contains("Same topic, new numbers"));
    assert!(body.contains("hard"));
}

#[tokio::test]
async fn test_generate_similar_quantity_out_of_range() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("question.png");
    fs::write(&image, b"png").unwrap();
    let backend = FakeBackend::start(vec![]);
    let request = SimilarRequest {
        instruction: "Same topic".to_string(),
        difficulty: Difficulty::Easy,
        quantity: 21,
    };

    let err = client(&backend).generate_similar(&image, &request).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_login_without_credentials() {
    let backend =
        FakeBackend::start(vec![Route::json("POST", "/api/auth/login", 200, login_json("tok-new"))]);
    let anonymous = StudioClient::new(backend.url(), None).unwrap();

    let creds = anonymous.login("ada@example.com", "correct horse").await.unwrap();

    assert_eq!(creds.access_token, "tok-new");
    assert_eq!(creds.user.map(|u| u.display_name), Some(Some("Ada".to_string())));
    let requests = backend.requests();
    assert_eq!(requests[0].authorization, None);
}

#[tokio::test]
async fn test_me_unauthorized() {
    let backend =
        FakeBackend::start(vec![Route::detail("GET", "/api/auth/me", 401, "Invalid token")]);

    let err = client(&backend).me().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Invalid token");
}
