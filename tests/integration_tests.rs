//! Integration tests for the Article Eater client
//!
//! These tests run the request pipeline and endpoint calls against a local
//! mock backend.

use article_eater_client::api::PARSE_ERROR_MESSAGE;
use article_eater_client::models::{JobStatus, JobType, Provider};
use article_eater_client::notify::{spawn_guarded, RecordingNotifier, UNEXPECTED_ERROR_MESSAGE};
use article_eater_client::storage::MemoryStore;
use article_eater_client::{ApiError, ArticleEaterClient, RequestOptions};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_test::{assert_err, assert_ok};

fn client_for(
    server: &mockito::Server,
    token: Option<&str>,
) -> (ArticleEaterClient, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let store = match token {
        Some(token) => MemoryStore::with_credential(token),
        None => MemoryStore::new(),
    };

    let client = ArticleEaterClient::builder()
        .base_url(server.url())
        .credential_store(Arc::new(store))
        .notifier(notifier.clone())
        .build()
        .unwrap();

    (client, notifier)
}

#[tokio::test]
async fn test_authorization_header_sent_with_stored_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/healthz")
        .match_header("authorization", "Bearer secret-token")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"ok"}"#)
        .create_async()
        .await;

    let (client, notifier) = client_for(&server, Some("secret-token"));
    let health = assert_ok!(client.health_check().await);

    assert_eq!(health["status"], "ok");
    assert!(notifier.diagnostics().is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/healthz")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"status":"ok"}"#)
        .create_async()
        .await;

    let (client, _) = client_for(&server, None);
    assert!(!client.has_credential());
    assert_ok!(client.health_check().await);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_caller_authorization_is_replaced_by_stored_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/usage/me")
        .match_header("authorization", "Bearer stored")
        .match_header("x-trace", "abc")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let (client, _) = client_for(&server, Some("stored"));
    let options = RequestOptions::get()
        .header("Authorization", "Bearer caller")
        .header("X-Trace", "abc");

    assert_ok!(client.request("/usage/me", options).await);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_detail_becomes_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/jobs/missing")
        .with_status(404)
        .with_body(r#"{"detail":"not found"}"#)
        .create_async()
        .await;

    let (client, notifier) = client_for(&server, None);
    let err = assert_err!(client.get_job_status("missing").await);

    assert_eq!(err.to_string(), "not found");
    assert_eq!(err, ApiError::Request("not found".to_string()));

    let diagnostics = notifier.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].0, "/jobs/missing");
    assert_eq!(diagnostics[0].1, err);
}

#[tokio::test]
async fn test_unparseable_error_body_falls_back_to_status_line() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/profile")
        .with_status(500)
        .with_body("<html>upstream exploded</html>")
        .create_async()
        .await;

    let (client, _) = client_for(&server, Some("tok"));
    let err = assert_err!(client.get_profile().await);

    assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
}

/// Serve one raw HTTP/1.1 response to the first connection and return the base URL
async fn serve_raw_once(response: &'static str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_server_status_text_is_passed_through() {
    let base_url = serve_raw_once(
        "HTTP/1.1 500 Upstream Broke\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
    )
    .await;

    let client = ArticleEaterClient::builder()
        .base_url(base_url)
        .build()
        .unwrap();
    let err = assert_err!(client.health_check().await);

    assert_eq!(err.message(), "HTTP 500: Upstream Broke");
}

#[tokio::test]
async fn test_invalid_success_body_is_parse_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rules/r1")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let (client, notifier) = client_for(&server, None);
    let err = assert_err!(client.get_rule("r1").await);

    assert_eq!(err, ApiError::Parse(PARSE_ERROR_MESSAGE.to_string()));
    assert_eq!(notifier.diagnostics().len(), 1);
}

#[tokio::test]
async fn test_transport_failure_is_reported() {
    let notifier = Arc::new(RecordingNotifier::new());
    let client = ArticleEaterClient::builder()
        .base_url("http://127.0.0.1:1")
        .notifier(notifier.clone())
        .build()
        .unwrap();

    let err = assert_err!(client.health_check().await);

    assert!(matches!(err, ApiError::Transport(_)));
    assert!(!err.message().is_empty());

    let diagnostics = notifier.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].0, "/healthz");
}

#[tokio::test]
async fn test_submit_job_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/jobs/")
        .match_body(Matcher::Json(json!({
            "job_type": "L0_harvest",
            "params": {"query": "daylight and mood"},
            "priority": 100
        })))
        .with_status(200)
        .with_body(r#"{"job_id":"j-1","status":"pending"}"#)
        .create_async()
        .await;

    let (client, _) = client_for(&server, Some("tok"));
    let job = assert_ok!(
        client
            .submit_job(JobType::Harvest, json!({"query": "daylight and mood"}), None)
            .await
    );

    assert_eq!(job["job_id"], "j-1");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_jobs_query() {
    let mut server = mockito::Server::new_async().await;
    let filtered = server
        .mock("GET", "/jobs/?status=running&limit=5")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let unfiltered = server
        .mock("GET", "/jobs/?limit=100")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let (client, _) = client_for(&server, None);
    assert_ok!(client.list_jobs(Some(&JobStatus::Running), Some(5)).await);
    assert_ok!(client.list_jobs(None, None).await);

    filtered.assert_async().await;
    unfiltered.assert_async().await;
}

#[tokio::test]
async fn test_library_paths_are_encoded() {
    let mut server = mockito::Server::new_async().await;
    let search = server
        .mock("GET", "/library/search?q=circadian%20lighting%20%26%20sleep")
        .with_status(200)
        .with_body(r#"{"results":[]}"#)
        .create_async()
        .await;
    let article = server
        .mock("GET", "/library/doi%2F10.1000%2Fxyz")
        .with_status(200)
        .with_body(r#"{"id":"doi/10.1000/xyz"}"#)
        .create_async()
        .await;
    let page = server
        .mock("GET", "/library/?limit=50&offset=0")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let (client, _) = client_for(&server, None);
    assert_ok!(client.search_articles("circadian lighting & sleep").await);
    assert_ok!(client.get_article("doi/10.1000/xyz").await);
    assert_ok!(client.list_articles(None, None).await);

    search.assert_async().await;
    article.assert_async().await;
    page.assert_async().await;
}

#[tokio::test]
async fn test_findings_and_rules_paths() {
    let mut server = mockito::Server::new_async().await;
    let mocks = vec![
        server
            .mock("GET", "/findings?article_id=a-7")
            .with_body("[]")
            .create_async()
            .await,
        server
            .mock("GET", "/findings?limit=100")
            .with_body("[]")
            .create_async()
            .await,
        server
            .mock("GET", "/rules?limit=50")
            .with_body("[]")
            .create_async()
            .await,
        server
            .mock("GET", "/rules/r-2/evidence")
            .with_body("[]")
            .create_async()
            .await,
        server
            .mock("GET", "/usage/admin")
            .with_body("{}")
            .create_async()
            .await,
    ];

    let (client, _) = client_for(&server, Some("admin"));
    assert_ok!(client.get_findings("a-7").await);
    assert_ok!(client.get_all_findings(None).await);
    assert_ok!(client.list_rules(None).await);
    assert_ok!(client.get_rule_evidence("r-2").await);
    assert_ok!(client.get_usage_admin().await);

    for mock in mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_profile_and_api_keys() {
    let mut server = mockito::Server::new_async().await;
    let update = server
        .mock("PATCH", "/profile")
        .match_body(Matcher::Json(json!({"display_name": "Ada"})))
        .with_body(r#"{"display_name":"Ada"}"#)
        .create_async()
        .await;
    let add = server
        .mock("POST", "/profile/api-keys")
        .match_body(Matcher::Json(json!({"provider": "anthropic", "key": "sk-ant-123"})))
        .with_body(r#"{"provider":"anthropic"}"#)
        .create_async()
        .await;
    let delete_custom = server
        .mock("DELETE", "/profile/api-keys/Mistral")
        .with_body(r#"{"deleted":true}"#)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/profile/api-keys/openai")
        .with_body(r#"{"deleted":true}"#)
        .create_async()
        .await;

    let (client, _) = client_for(&server, Some("tok"));
    let profile = assert_ok!(client.update_profile(json!({"display_name": "Ada"})).await);
    assert_eq!(profile["display_name"], "Ada");
    assert_ok!(client.add_api_key(Provider::Anthropic, "sk-ant-123").await);
    assert_ok!(client.delete_api_key(&Provider::OpenAi).await);
    let custom: Provider = "Mistral".parse().unwrap();
    assert_ok!(client.delete_api_key(&custom).await);

    update.assert_async().await;
    add.assert_async().await;
    delete.assert_async().await;
    delete_custom.assert_async().await;
}

#[tokio::test]
async fn test_reload_credential_picks_up_login() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/profile")
        .match_header("authorization", "Bearer fresh")
        .with_body("{}")
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::new());
    let mut client = ArticleEaterClient::builder()
        .base_url(server.url())
        .credential_store(store.clone())
        .build()
        .unwrap();
    assert!(!client.has_credential());

    store.set("ae_api_key", "fresh");
    assert!(client.reload_credential().unwrap());
    assert_ok!(client.get_profile().await);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_unhandled_failure_shows_generic_toast() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/healthz")
        .with_status(503)
        .with_body("{}")
        .create_async()
        .await;

    let (client, notifier) = client_for(&server, None);
    let outcome = spawn_guarded(notifier.clone(), async move { client.health_check().await })
        .await
        .unwrap();

    assert!(outcome.is_none());
    let toasts = notifier.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, UNEXPECTED_ERROR_MESSAGE);
    assert_eq!(notifier.diagnostics()[0].1.message(), "HTTP 503: Service Unavailable");
}
