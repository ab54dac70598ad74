//! HTTP backend against a mock server.

use querydesk::api::{Backend, HttpBackend};
use querydesk::config::ApiConfig;
use querydesk::error::DeskError;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&ApiConfig {
        base_url: format!("{}/api/", server.uri()),
        timeout_secs: Some(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_run_query_posts_json_and_decodes_rows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/run-query"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "query": "SELECT ArtistId, Name FROM Artist LIMIT 2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columns": ["ArtistId", "Name"],
            "rows": [[1, "AC/DC"], [2, null]],
            "row_count": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = backend_for(&server)
        .run_query("SELECT ArtistId, Name FROM Artist LIMIT 2")
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["ArtistId", "Name"]);
    assert_eq!(result.rows[0], vec!["1", "AC/DC"]);
    assert_eq!(result.rows[1], vec!["2", "NULL"]);
    assert_eq!(result.row_count, 2);
}

#[tokio::test]
async fn test_run_query_error_uses_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/run-query"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "(sqlite3.OperationalError) no such table: Artists"
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .run_query("SELECT * FROM Artists")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DeskError::backend("(sqlite3.OperationalError) no such table: Artists")
    );
}

#[tokio::test]
async fn test_run_query_error_without_detail_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/run-query"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = backend_for(&server).run_query("SELECT 1").await.unwrap_err();
    assert_eq!(err.user_message(), "Failed to execute query");
}

#[tokio::test]
async fn test_ask_ai_returns_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ask-ai"))
        .and(body_json(json!({ "query": "Which genre has the most tracks?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "**Rock** has the most tracks."
        })))
        .mount(&server)
        .await;

    let answer = backend_for(&server)
        .ask_ai("Which genre has the most tracks?")
        .await
        .unwrap();
    assert_eq!(answer.response, "**Rock** has the most tracks.");
}

#[tokio::test]
async fn test_ask_ai_error_without_detail_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ask-ai"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "detail": "" })))
        .mount(&server)
        .await;

    let err = backend_for(&server).ask_ai("hello").await.unwrap_err();
    assert_eq!(err, DeskError::backend("Failed to get AI response"));
}

#[tokio::test]
async fn test_unexpected_success_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ask-ai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "wrong key" })))
        .mount(&server)
        .await;

    let err = backend_for(&server).ask_ai("hello").await.unwrap_err();
    assert!(matches!(err, DeskError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Reserve a free port, then close it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let backend = HttpBackend::new(&ApiConfig {
        base_url: format!("http://127.0.0.1:{port}/api"),
        timeout_secs: Some(5),
    })
    .unwrap();

    let err = backend.run_query("SELECT 1").await.unwrap_err();
    assert!(matches!(err, DeskError::Transport(_)), "got {err:?}");
}
