//! HttpDirectoryClient against a local fake of the directory API

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use omnicall_client_core::directory::lookup_quietly;
use omnicall_client_core::recovery::RetryConfig;
use omnicall_client_core::{DirectoryLookup, HttpDirectoryClient, LookupError};
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct FakeApi {
    hits: Arc<AtomicUsize>,
}

async fn by_phone(
    State(api): State<FakeApi>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    api.hits.fetch_add(1, Ordering::SeqCst);
    match params.get("phone").map(String::as_str) {
        Some("+27672966361") => Json(json!({
            "success": true,
            "customer": {
                "id": 4,
                "first_name": "Thandi",
                "last_name": "Mokoena",
                "phone": "+27672966361",
                "affiliation": "Discovery Health",
                "plan": "Classic Saver",
                "company_id": 1,
                "created_at": "2024-05-01T09:30:00Z"
            }
        }))
        .into_response(),
        Some("boom") => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        Some("garbled") => "not json".into_response(),
        _ => Json(json!({ "success": false })).into_response(),
    }
}

async fn start_fake_api() -> (String, FakeApi) {
    let api = FakeApi::default();
    let app = Router::new()
        .route("/api/customers/by-phone", get(by_phone))
        .with_state(api.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), api)
}

#[tokio::test]
async fn test_lookup_hit() {
    let (base, _) = start_fake_api().await;
    let client = HttpDirectoryClient::new(base);

    let entry = client.lookup_by_phone("+27672966361").await.unwrap().unwrap();
    assert_eq!(entry.display_name(), "Thandi Mokoena");
    assert_eq!(entry.affiliation.as_deref(), Some("Discovery Health"));
}

#[tokio::test]
async fn test_lookup_miss_is_not_an_error() {
    let (base, _) = start_fake_api().await;
    let client = HttpDirectoryClient::new(base);

    assert_eq!(client.lookup_by_phone("+15550000000").await, Ok(None));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let (base, api) = start_fake_api().await;
    let client = HttpDirectoryClient::new(base).with_retry(RetryConfig::quick());

    let err = client.lookup_by_phone("boom").await.unwrap_err();
    assert_eq!(err, LookupError::Status(500));
    assert_eq!(api.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_bad_body_is_not_retried() {
    let (base, api) = start_fake_api().await;
    let client = HttpDirectoryClient::new(base);

    let err = client.lookup_by_phone("garbled").await.unwrap_err();
    assert!(matches!(err, LookupError::Decode(_)));
    assert_eq!(api.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_directory_is_absorbed() {
    let client = HttpDirectoryClient::new("http://127.0.0.1:9").with_retry(RetryConfig::none());
    assert!(lookup_quietly(&client, "+27672966361").await.is_none());
}
