use pmos_core::find_agent;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{client_for, content_body};
use crate::chat::{ChatRole, ChatTurn};
use crate::error::LlmError;

fn hello() -> Vec<ChatTurn> {
    vec![ChatTurn { role: ChatRole::User, content: "hello".to_owned() }]
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(content_body("  test response ")))
        .expect(1)
        .mount(&server)
        .await;

    let agent = find_agent("nova").unwrap();
    let reply = client.agent_reply(agent, None, &hello()).await.unwrap();
    assert_eq!(reply, "test response");
}

#[tokio::test]
async fn test_retry_on_503_then_success() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(content_body("after 503")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let agent = find_agent("nova").unwrap();
    let reply = client.agent_reply(agent, None, &hello()).await.unwrap();
    assert_eq!(reply, "after 503");
}

#[tokio::test]
async fn test_429_is_not_retried() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
        .expect(1)
        .mount(&server)
        .await;

    let agent = find_agent("nova").unwrap();
    let err = client.agent_reply(agent, None, &hello()).await.unwrap_err();
    assert!(matches!(err, LlmError::RateLimited(ref body) if body == "Rate limit exceeded"));
}

#[tokio::test]
async fn test_402_is_not_retried() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(402).set_body_string("Payment required"))
        .expect(1)
        .mount(&server)
        .await;

    let agent = find_agent("nova").unwrap();
    let err = client.agent_reply(agent, None, &hello()).await.unwrap_err();
    assert!(matches!(err, LlmError::PaymentRequired(_)));
}

#[tokio::test]
async fn test_no_retry_on_401() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let agent = find_agent("nova").unwrap();
    let err = client.agent_reply(agent, None, &hello()).await.unwrap_err();
    assert!(matches!(err, LlmError::HttpStatus { code: 401, .. }));
}

#[tokio::test]
async fn test_retries_exhausted_after_four_attempts() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(4)
        .mount(&server)
        .await;

    let agent = find_agent("nova").unwrap();
    let err = client.agent_reply(agent, None, &hello()).await.unwrap_err();
    assert!(matches!(err, LlmError::RetriesExhausted(_)));
    assert!(matches!(err.root(), LlmError::HttpStatus { code: 502, .. }));
}

#[tokio::test]
async fn test_empty_choices() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let agent = find_agent("nova").unwrap();
    let err = client.agent_reply(agent, None, &hello()).await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
}
