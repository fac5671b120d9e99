//! Service tests over the in-memory backend. LLM calls go to wiremock.

mod gamification_tests;
mod impact_tests;
mod squad_tests;

use std::sync::Arc;
use std::time::Duration;

use pmos_core::{ArtifactContent, Epic, Prd, PrdRequirement, Priority, RealtimeEvent};
use pmos_llm::LlmClient;
use pmos_storage::StorageBackend;
use tokio::sync::broadcast;
use uuid::Uuid;
use wiremock::MockServer;

use crate::{NewArtifact, Services};

pub struct Harness {
    pub services: Services,
    pub storage: Arc<StorageBackend>,
    pub events: broadcast::Receiver<RealtimeEvent>,
}

pub fn harness(llm: Option<Arc<LlmClient>>) -> Harness {
    let storage = Arc::new(StorageBackend::new_memory());
    let (event_tx, events) = broadcast::channel(1024);
    let services = Services::new(Arc::clone(&storage), llm, event_tx);
    Harness { services, storage, events }
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn llm_for(server: &MockServer) -> Arc<LlmClient> {
    Arc::new(
        LlmClient::new("test-key".to_owned(), server.uri())
            .unwrap()
            .with_model("test-model".to_owned())
            .with_retry_unit(Duration::from_millis(5)),
    )
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub async fn sign_up(h: &Harness) -> Uuid {
    h.services.profiles.sign_up("Test PM", None).await.unwrap().view.profile.id
}

pub fn drain_events(rx: &mut broadcast::Receiver<RealtimeEvent>) -> Vec<RealtimeEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn epic_input(title: &str, prd_id: Option<Uuid>) -> NewArtifact {
    NewArtifact {
        title: title.to_owned(),
        content: ArtifactContent::Epic(Epic {
            title: title.to_owned(),
            description: "Let admins export reports".to_owned(),
            acceptance_criteria: vec!["CSV export works".to_owned()],
        }),
        product_context_id: None,
        prd_id,
    }
}

pub fn prd_input(name: &str) -> NewArtifact {
    NewArtifact {
        title: format!("{name} PRD"),
        content: ArtifactContent::Prd(prd(name, "Export reports as CSV")),
        product_context_id: None,
        prd_id: None,
    }
}

pub fn prd(name: &str, requirement: &str) -> Prd {
    Prd {
        product_name: name.to_owned(),
        summary: "Reporting for admins".to_owned(),
        problem: "Admins cannot share numbers".to_owned(),
        target_users: vec!["admins".to_owned()],
        goals: vec!["Faster reporting".to_owned()],
        requirements: vec![PrdRequirement {
            id: "R1".to_owned(),
            description: requirement.to_owned(),
            priority: Priority::High,
        }],
        success_metrics: vec![],
        out_of_scope: vec![],
    }
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

pub fn content_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}
