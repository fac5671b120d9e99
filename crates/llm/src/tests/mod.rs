//! Gateway tests against a wiremock server.

mod retry_tests;

use std::time::Duration;

use wiremock::MockServer;

use crate::client::LlmClient;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn client_for(server: &MockServer) -> LlmClient {
    LlmClient::new("test-key".to_owned(), server.uri())
        .unwrap()
        .with_model("test-model".to_owned())
        .with_retry_unit(Duration::from_millis(5))
}

pub fn content_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{
            "message": {
                "content": content,
                "role": "assistant"
            }
        }]
    })
}

pub fn tool_body(name: &str, arguments: &serde_json::Value) -> serde_json::Value {
    serde_json::json!({
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
