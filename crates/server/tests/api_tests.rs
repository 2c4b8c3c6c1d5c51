//! HTTP API tests driven through the router with `oneshot`

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use omnicall_directory_core::{CreateAgentRequest, CreateCustomerRequest, DirectoryStore, SqliteDirectoryStore};
use omnicall_server::ServerConfig;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<SqliteDirectoryStore>,
    _dir: TempDir,
}

async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("omnicall.db").display());
    let store = Arc::new(SqliteDirectoryStore::connect(&url, 2).await.unwrap());

    let config = ServerConfig::load_with(None, Default::default()).unwrap();
    let router = omnicall_server::app(store.clone(), &config);
    TestApp { router, store, _dir: dir }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, String) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    let (status, body) = send(app, Request::get(uri).body(Body::empty()).unwrap()).await;
    (status, serde_json::from_str(&body).unwrap())
}

async fn post_json(app: &TestApp, uri: &str, payload: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

async fn add_customer(app: &TestApp, first: &str, last: &str, phone: &str) {
    app.store
        .create_customer(CreateCustomerRequest {
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone: Some(phone.to_string()),
            affiliation: Some("Discovery Health".to_string()),
            plan: Some("Classic Saver".to_string()),
            company_id: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_health_and_root() {
    let app = test_app().await;

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, body) = get_json(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "OmniCall API Server");
}

#[tokio::test]
async fn test_companies_default_and_create() {
    let app = test_app().await;

    let (status, body) = get_json(&app, "/api/companies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["companies"][0]["name"], "Default Company");

    let (status, body) = post_json(&app, "/api/companies", json!({ "name": "Sunrise Clinic" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["company"]["name"], "Sunrise Clinic");

    let (status, body) = post_json(&app, "/api/companies", json!({ "name": "Sunrise Clinic" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Company with this name already exists");

    let (status, body) = post_json(&app, "/api/companies", json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Company name is required");

    let (_, body) = get_json(&app, "/api/companies").await;
    assert_eq!(body["companies"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_body_is_rejected() {
    let app = test_app().await;
    let request = Request::post("/api/companies")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["detail"], "Invalid request body");
}

#[tokio::test]
async fn test_customer_create_and_list() {
    let app = test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/customers",
        json!({ "first_name": "Thandi", "last_name": "Mokoena", "phone": "067 296 6361" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["customer"]["phone"], "067 296 6361");

    let (status, body) = post_json(&app, "/api/customers", json!({ "first_name": "Bad", "phone": "call me" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("not dialable"));

    let (status, body) = post_json(&app, "/api/customers", json!({ "last_name": "Nameless" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "First name is required");

    add_customer(&app, "Sipho", "Dlamini", "+27821234567").await;
    let (_, body) = get_json(&app, "/api/customers").await;
    let customers = body["customers"].as_array().unwrap();
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0]["first_name"], "Sipho");
}

#[tokio::test]
async fn test_lookup_by_phone() {
    let app = test_app().await;
    add_customer(&app, "Thandi", "Mokoena", "555.123.4567").await;

    let (status, body) = get_json(&app, "/api/customers/by-phone?phone=555.123.4567").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["customer"]["first_name"], "Thandi");

    let (status, body) = get_json(&app, "/api/customers/by-phone?phone=%28555%29%20123-4567").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer"]["last_name"], "Mokoena");

    let (status, body) = get_json(&app, "/api/customers/by-phone?phone=%2B15550000000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false }));

    let (status, body) = get_json(&app, "/api/customers/by-phone").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Phone number is required");
}

#[tokio::test]
async fn test_outbound_voice_webhook() {
    let app = test_app().await;

    let request = Request::post("/twilio/outbound-voice")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("To=%2B27672966361&CallSid=CA123"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/xml");
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let xml = String::from_utf8(body.to_vec()).unwrap();
    assert!(xml.contains(r#"<Dial callerId="+13612664115">"#));
    assert!(xml.contains("<Number>+27672966361</Number>"));

    let (status, xml) = send(&app, Request::get("/twilio/outbound-voice").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains("<Number>+1234567890</Number>"));
}

#[tokio::test]
async fn test_incoming_call_routes_to_first_agent() {
    let app = test_app().await;

    let (_, xml) = send(&app, Request::get("/twilio/incoming-call").body(Body::empty()).unwrap()).await;
    assert!(xml.contains("<Client>agent001</Client>"));

    let companies = app.store.ensure_default_company().await.unwrap();
    app.store
        .create_agent(CreateAgentRequest {
            agent_id: "reception-1".to_string(),
            first_name: "Naledi".to_string(),
            last_name: "Khumalo".to_string(),
            email: "naledi@example.org".to_string(),
            company_id: companies[0].id,
        })
        .await
        .unwrap();

    let request = Request::post("/twilio/incoming-call")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("From=%2B27672966361&To=%2B13612664115&CallSid=CA456"))
        .unwrap();
    let (status, xml) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains("<Say>Welcome to OmniCall."));
    assert!(xml.contains("<Client>reception-1</Client>"));
}

#[tokio::test]
async fn test_agent_creation_via_api() {
    let app = test_app().await;
    let companies = app.store.ensure_default_company().await.unwrap();
    let payload = json!({
        "agent_id": "reception-1",
        "first_name": "Naledi",
        "last_name": "Khumalo",
        "email": "naledi@example.org",
        "company_id": companies[0].id,
    });

    let (status, body) = post_json(&app, "/api/agents", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["agent"]["agent_id"], "reception-1");

    let (status, body) = post_json(&app, "/api/agents", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Agent ID or email already exists");
}

#[tokio::test]
async fn test_cors_allows_dev_origin() {
    let app = test_app().await;
    let request = Request::get("/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
}
