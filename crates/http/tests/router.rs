#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use pmos_http::{AppState, create_router};
use pmos_llm::LlmClient;
use pmos_storage::StorageBackend;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ──

fn app(llm: Option<Arc<LlmClient>>) -> axum::Router {
    let state = AppState::new(Arc::new(StorageBackend::new_memory()), llm);
    create_router(Arc::new(state))
}

fn llm_for(server: &MockServer) -> Arc<LlmClient> {
    Arc::new(
        LlmClient::new("test-key".to_owned(), server.uri())
            .unwrap()
            .with_model("test-model".to_owned())
            .with_retry_unit(Duration::from_millis(5)),
    )
}

/// Send a request via `oneshot` and return (status, parsed JSON body).
async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Body>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {token}"));
    }
    if body.is_some() {
        req = req.header("content-type", "application/json");
    }
    let req = req.body(body.unwrap_or_else(Body::empty)).unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: &axum::Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, Some(token), None).await
}

async fn post_json(app: &axum::Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(token), Some(Body::from(body.to_string()))).await
}

/// Sign up and return (user id, token).
async fn sign_up(app: &axum::Router) -> (String, String) {
    let body = Body::from(json!({"displayName": "Ada"}).to_string());
    let (status, json) = send(app, "POST", "/api/profiles", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    (json["id"].as_str().unwrap().to_owned(), json["token"].as_str().unwrap().to_owned())
}

fn tool_body(name: &str, arguments: &Value) -> Value {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": name, "arguments": arguments.to_string()}
                }]
            }
        }]
    })
}

// ── Tests ──

#[tokio::test]
async fn test_health_is_public() {
    let app = app(None);
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_sign_up_then_me() {
    let app = app(None);
    let (id, token) = sign_up(&app).await;
    assert!(token.starts_with("pmos_"));

    let (status, me) = get(&app, "/api/profiles/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], id.as_str());
    assert_eq!(me["displayName"], "Ada");
    assert_eq!(me["stats"]["level"], 1);
}

#[tokio::test]
async fn test_missing_or_unknown_token_is_unauthorized() {
    let app = app(None);
    let (status, body) = send(&app, "GET", "/api/profiles/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = get(&app, "/api/squads", "pmos_not-a-real-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request_with_json_body() {
    let app = app(None);
    let (_, token) = sign_up(&app).await;

    let raw = Body::from("{not json");
    let (status, body) = send(&app, "POST", "/api/squads", Some(&token), Some(raw)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = post_json(&app, "/api/squads", &token, json!({"description": "x"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_invalid_uuid_in_path_is_bad_request() {
    let app = app(None);
    let (_, token) = sign_up(&app).await;
    let (status, body) = get(&app, "/api/artifacts/not-a-uuid", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_squad_lifecycle() {
    let app = app(None);
    let (_, token) = sign_up(&app).await;

    let (status, squad) = post_json(&app, "/api/squads", &token, json!({"name": "Core"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = squad["id"].as_str().unwrap().to_owned();

    let uri = format!("/api/squads/{id}/agents");
    let (status, squad) = post_json(&app, &uri, &token, json!({"agentSlug": "nova"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(squad["agents"].as_array().unwrap().len(), 1);

    let (status, _) = post_json(&app, &uri, &token, json!({"agentSlug": "nova"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post_json(&app, &uri, &token, json!({"agentSlug": "forge"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/squads/{id}");
    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get(&app, &uri, &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missions_are_listed_for_today() {
    let app = app(None);
    let (_, token) = sign_up(&app).await;
    let (status, missions) = get(&app, "/api/missions", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!missions.as_array().unwrap().is_empty());

    let (status, again) = get(&app, "/api/missions", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(missions, again);
}

#[tokio::test]
async fn test_generate_stories_returns_requested_count() {
    let server = MockServer::start().await;
    let stories: Vec<Value> = (0..4)
        .map(|i| {
            json!({
                "title": format!("Story {i}"),
                "asA": "admin",
                "iWant": "to export",
                "soThat": "I can share",
                "acceptanceCriteria": ["works"],
                "effortPoints": 3,
                "priority": "medium"
            })
        })
        .collect();
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_body(
            "create_user_stories",
            &json!({"stories": stories}),
        )))
        .mount(&server)
        .await;
    let app = app(Some(llm_for(&server)));
    let (_, token) = sign_up(&app).await;

    let body = json!({
        "epic": {"title": "Reporting", "description": "Export reports"},
        "options": {"storyCount": 3}
    });
    let (status, json) = post_json(&app, "/functions/v1/generate-stories", &token, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stories"].as_array().unwrap().len(), 3);
    assert!(json.get("artifactId").is_none());
}

#[tokio::test]
async fn test_upstream_rate_limit_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(Some(llm_for(&server)));
    let (_, token) = sign_up(&app).await;

    let body = json!({"productName": "Ledger", "idea": "Shared budgets"});
    let (status, json) = post_json(&app, "/functions/v1/generate-canvas", &token, body).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"], "slow down");
}

#[tokio::test]
async fn test_upstream_payment_required_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(402).set_body_string("credits exhausted"))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(Some(llm_for(&server)));
    let (_, token) = sign_up(&app).await;

    let body = json!({"productName": "Ledger", "idea": "Shared budgets"});
    let (status, json) = post_json(&app, "/functions/v1/generate-canvas", &token, body).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(json["error"], "credits exhausted");
}

#[tokio::test]
async fn test_functions_without_gateway_are_unavailable() {
    let app = app(None);
    let (_, token) = sign_up(&app).await;
    let body = json!({"productName": "Ledger", "idea": "Shared budgets"});
    let (status, _) = post_json(&app, "/functions/v1/generate-canvas", &token, body).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_analyze_impact_rejects_foreign_user_id() {
    let app = app(None);
    let (_, token) = sign_up(&app).await;
    let (other_id, _) = sign_up(&app).await;

    let body = json!({
        "documentText": "New requirement",
        "documentName": "PRD v2",
        "artefactId": uuid_str(),
        "userId": other_id
    });
    let (status, _) = post_json(&app, "/functions/v1/analyze-impact", &token, body).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_processing_toggle() {
    let app = app(None);
    let (_, token) = sign_up(&app).await;
    let uri = "/api/admin/impact-queue/processing";
    let (status, json) = post_json(&app, uri, &token, json!({"active": false})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["active"], false);
    let (_, json) = get(&app, uri, &token).await;
    assert_eq!(json["active"], false);

    let (status, stats) = get(&app, "/api/admin/impact-queue/stats", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["pending"], 0);
}

fn uuid_str() -> String {
    "00000000-0000-4000-8000-000000000001".to_owned()
}
