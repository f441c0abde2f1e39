//! Service tests: store operations with remote log shipping attached

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use snaplink::error::AppError;
use snaplink::logger::{LogClient, LogSettings, Stack};
use snaplink::model::{ClickContext, CreateRequest};
use snaplink::service::UrlService;
use snaplink::store::UrlStore;

type Messages = Arc<Mutex<Vec<Value>>>;

async fn spawn_endpoint(status: StatusCode) -> (String, Messages) {
    let messages = Messages::default();
    let router = Router::new()
        .route(
            "/logs",
            post(move |State(m): State<Messages>, Json(body): Json<Value>| async move {
                m.lock().await.push(body);
                status
            }),
        )
        .with_state(messages.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}/logs", addr), messages)
}

fn service(endpoint: String) -> UrlService {
    let logger = LogClient::new(&LogSettings {
        endpoint: Some(endpoint),
        auth_token: "token".to_string(),
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        timeout: Duration::from_millis(500),
        stack: Stack::Backend,
    })
    .unwrap();
    UrlService::new(UrlStore::new("http://localhost", 5), logger)
}

/// Waits for the background sends to land at the endpoint
async fn wait_for(messages: &Messages, needle: &str) -> bool {
    for _ in 0..50 {
        let found = messages
            .lock()
            .await
            .iter()
            .any(|m| m["message"].as_str().unwrap_or_default().contains(needle));
        if found {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_operations_ship_logs() {
    let (endpoint, messages) = spawn_endpoint(StatusCode::OK).await;
    let service = service(endpoint);

    let record = service
        .shorten(&CreateRequest {
            original_url: "https://example.com".to_string(),
            custom_short_code: Some("logged".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(record.short_code, "logged");
    assert!(wait_for(&messages, "URL successfully shortened: logged").await);

    service.resolve("logged", &ClickContext::direct()).await.unwrap();
    assert!(wait_for(&messages, "Redirecting logged to: https://example.com").await);

    let err = service.get("missing").await.unwrap_err();
    assert_eq!(err, AppError::not_found("missing"));
    assert!(wait_for(&messages, "Short code not found: missing").await);

    let entry = messages.lock().await[0].clone();
    assert_eq!(entry["stack"], "backend");
}

#[tokio::test]
async fn test_failing_log_endpoint_does_not_affect_results() {
    let (endpoint, messages) = spawn_endpoint(StatusCode::INTERNAL_SERVER_ERROR).await;
    let service = service(endpoint);

    service
        .shorten(&CreateRequest {
            original_url: "https://example.com".to_string(),
            custom_short_code: Some("sturdy".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(wait_for(&messages, "sturdy").await);

    let click = service
        .record_click("sturdy", &ClickContext::direct())
        .await;
    assert!(click.is_some());
    assert_eq!(service.click_logs("sturdy").await.len(), 1);
    assert!(service.delete("sturdy").await);
    assert!(!service.delete("sturdy").await);
    assert!(service.list().await.is_empty());
}

#[tokio::test]
async fn test_collision_is_reported() {
    let (endpoint, messages) = spawn_endpoint(StatusCode::OK).await;
    let service = service(endpoint);

    let request = CreateRequest {
        original_url: "https://example.com".to_string(),
        custom_short_code: Some("taken".to_string()),
        ..Default::default()
    };
    service.shorten(&request).await.unwrap();

    let err = service.shorten(&request).await.unwrap_err();
    assert!(matches!(err, AppError::Collision { .. }));
    assert!(wait_for(&messages, "Shortcode collision detected: taken").await);
}
