//! Provider tests against a local mock server.
//!
//! Each test starts an axum server on a random port that records the requests
//! it receives and answers with a scripted sequence of responses.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use notesum::api::RetryConfig;
use notesum::prompt::SummaryLength;
use notesum::provider::{ClaudeProvider, OpenAiProvider, SummaryOptions, SummaryProvider};
use notesum::summarizer::SummarizerService;
use serde_json::{Value, json};

#[derive(Clone)]
struct Mock {
    responses: Arc<Vec<(StatusCode, String)>>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

async fn respond(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    mock.requests.lock().unwrap().push((headers, body));
    let n = mock.calls.fetch_add(1, Ordering::SeqCst);
    let idx = n.min(mock.responses.len() - 1);
    mock.responses[idx].clone()
}

/// Helper: spawn a mock server and return it with its endpoint URL.
async fn spawn_mock(path: &str, responses: Vec<(StatusCode, String)>) -> (Mock, String) {
    let mock = Mock {
        responses: Arc::new(responses),
        calls: Arc::new(AtomicUsize::new(0)),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route(path, post(respond))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (mock, format!("http://{addr}{path}"))
}

fn options(length: SummaryLength) -> SummaryOptions {
    SummaryOptions {
        api_key: "test-key".into(),
        model: "test-model".into(),
        length,
    }
}

fn fast_retry() -> RetryConfig {
    RetryConfig {
        initial_delay: Duration::from_millis(5),
        ..RetryConfig::with_retries(1)
    }
}

fn claude_ok(text: &str) -> (StatusCode, String) {
    let body = json!({
        "content": [{"type": "text", "text": text}],
        "model": "test-model",
        "usage": {"input_tokens": 10, "output_tokens": 5}
    });
    (StatusCode::OK, body.to_string())
}

fn openai_ok(text: &str) -> (StatusCode, String) {
    let body = json!({
        "choices": [{"message": {"role": "assistant", "content": text}}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5}
    });
    (StatusCode::OK, body.to_string())
}

// ── Claude ───────────────────────────────────────────────────────────

#[tokio::test]
async fn claude_sends_expected_request() {
    let (mock, url) = spawn_mock("/v1/messages", vec![claude_ok("  A summary.  ")]).await;
    let provider = ClaudeProvider::new()
        .unwrap()
        .with_endpoint(url)
        .with_retry_config(RetryConfig::none());

    let summary = provider
        .summarize("Note about Rust.", &options(SummaryLength::Short))
        .await
        .unwrap();
    assert_eq!(summary, "A summary.");

    let requests = mock.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (headers, body) = &requests[0];
    assert_eq!(headers["x-api-key"], "test-key");
    assert_eq!(headers["anthropic-version"], "2023-06-01");
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["max_tokens"], 512);
    assert_eq!(body["messages"][0]["role"], "user");
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("3-5 sentences"));
    assert!(prompt.ends_with("Note about Rust."));
}

#[tokio::test]
async fn claude_auth_failure_is_not_retried() {
    let (mock, url) = spawn_mock(
        "/v1/messages",
        vec![(StatusCode::UNAUTHORIZED, r#"{"error":{"message":"bad key"}}"#.into())],
    )
    .await;
    let provider = ClaudeProvider::new()
        .unwrap()
        .with_endpoint(url)
        .with_retry_config(fast_retry());

    let err = provider
        .summarize("text", &options(SummaryLength::Standard))
        .await
        .unwrap_err();
    assert!(err.contains("invalid API key"), "{err}");
    assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn claude_retries_once_on_server_error() {
    let (mock, url) = spawn_mock(
        "/v1/messages",
        vec![
            (StatusCode::SERVICE_UNAVAILABLE, String::new()),
            claude_ok("Recovered."),
        ],
    )
    .await;
    let provider = ClaudeProvider::new()
        .unwrap()
        .with_endpoint(url)
        .with_retry_config(fast_retry());

    let summary = provider
        .summarize("text", &options(SummaryLength::Standard))
        .await
        .unwrap();
    assert_eq!(summary, "Recovered.");
    assert_eq!(mock.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn claude_gives_up_after_one_retry() {
    let overloaded = (StatusCode::from_u16(529).unwrap(), String::new());
    let (mock, url) = spawn_mock("/v1/messages", vec![overloaded]).await;
    let provider = ClaudeProvider::new()
        .unwrap()
        .with_endpoint(url)
        .with_retry_config(fast_retry());

    let err = provider
        .summarize("text", &options(SummaryLength::Standard))
        .await
        .unwrap_err();
    assert!(err.contains("overloaded"), "{err}");
    assert_eq!(mock.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn claude_bad_request_includes_detail() {
    let (_mock, url) = spawn_mock(
        "/v1/messages",
        vec![(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"max_tokens too large"}}"#.into(),
        )],
    )
    .await;
    let provider = ClaudeProvider::new()
        .unwrap()
        .with_endpoint(url)
        .with_retry_config(RetryConfig::none());

    let err = provider
        .summarize("text", &options(SummaryLength::Detailed))
        .await
        .unwrap_err();
    assert_eq!(err, "bad request (HTTP 400): max_tokens too large");
}

#[tokio::test]
async fn claude_empty_content_is_an_error() {
    let empty = (StatusCode::OK, json!({"content": []}).to_string());
    let (_mock, url) = spawn_mock("/v1/messages", vec![empty]).await;
    let provider = ClaudeProvider::new()
        .unwrap()
        .with_endpoint(url)
        .with_retry_config(RetryConfig::none());

    let err = provider
        .summarize("text", &options(SummaryLength::Standard))
        .await
        .unwrap_err();
    assert_eq!(err, "the AI response was empty");
}

// ── OpenAI ───────────────────────────────────────────────────────────

#[tokio::test]
async fn openai_sends_bearer_auth_and_parses_choice() {
    let (mock, url) = spawn_mock("/v1/chat/completions", vec![openai_ok("GPT summary.")]).await;
    let provider = OpenAiProvider::new()
        .unwrap()
        .with_endpoint(url)
        .with_retry_config(RetryConfig::none());

    let summary = provider
        .summarize("러스트 노트", &options(SummaryLength::Detailed))
        .await
        .unwrap();
    assert_eq!(summary, "GPT summary.");

    let requests = mock.requests.lock().unwrap();
    let (headers, body) = &requests[0];
    assert_eq!(headers["authorization"], "Bearer test-key");
    assert_eq!(body["max_tokens"], 2048);
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("2-3단락"));
}

#[tokio::test]
async fn openai_rate_limit_message() {
    let (_mock, url) = spawn_mock(
        "/v1/chat/completions",
        vec![(StatusCode::TOO_MANY_REQUESTS, String::new())],
    )
    .await;
    let provider = OpenAiProvider::new()
        .unwrap()
        .with_endpoint(url)
        .with_retry_config(RetryConfig::none());

    let err = provider
        .summarize("text", &options(SummaryLength::Standard))
        .await
        .unwrap_err();
    assert!(err.contains("rate limit"), "{err}");
    assert!(err.contains("HTTP 429"));
}

// ── End to end ───────────────────────────────────────────────────────

#[tokio::test]
async fn service_updates_note_through_provider() {
    let (mock, url) = spawn_mock("/v1/messages", vec![claude_ok("Fresh summary.")]).await;
    let provider = ClaudeProvider::new()
        .unwrap()
        .with_endpoint(url)
        .with_retry_config(RetryConfig::none());
    let service = SummarizerService::with_provider(Box::new(provider));

    let body = "Rust ownership notes. ".repeat(10);
    let note = format!(
        "---\ntitle: x\n---\n## Summary\nOld summary.\n\n*Updated: 2024-01-01 10:00*\n\n# Notes\n{body}\n"
    );

    let updated = service
        .summarize_note(&note, &options(SummaryLength::Standard), "2024-02-01 09:00")
        .await
        .unwrap();

    assert!(updated.starts_with("---\ntitle: x\n---\n## Summary\nFresh summary.\n"));
    assert!(updated.contains("### 2024-01-01 10:00\nOld summary.\n"));
    assert!(updated.ends_with(&format!("# Notes\n{body}\n")));

    let requests = mock.requests.lock().unwrap();
    let prompt = requests[0].1["messages"][0]["content"].as_str().unwrap();
    assert!(!prompt.contains("Old summary."));
    assert!(!prompt.contains("title: x"));
}
