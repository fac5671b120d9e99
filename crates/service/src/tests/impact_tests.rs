use chrono::Duration;
use pmos_core::{ArtifactType, RealtimeEvent, RiskLevel};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use super::*;
use crate::ServiceError;

fn detect_body() -> serde_json::Value {
    tool_body(
        "report_changes",
        &serde_json::json!({
            "summary": "CSV export was replaced by PDF",
            "changes": [
                {
                    "section": "Export",
                    "changeKind": "removed",
                    "severity": "high",
                    "description": "CSV export is no longer required",
                    "suggestedAction": "Rewrite the acceptance criteria"
                },
                {"section": "Export", "changeKind": "added", "severity": "low", "description": "  "}
            ]
        }),
    )
}

async fn mount_detect(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("report_changes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detect_body()))
        .mount(server)
        .await;
}

#[expect(clippy::unwrap_used, reason = "test code")]
async fn queued_epic(h: &Harness, user: Uuid) -> Uuid {
    let epic = h.services.artifacts.create(user, epic_input("Export", None)).await.unwrap();
    h.services
        .impact
        .enqueue(user, epic.id, "Reports PRD", "Export reports as PDF".to_owned(), None, Duration::zero())
        .await
        .unwrap();
    epic.id
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_analyze_scores_and_rewards() {
    let server = MockServer::start().await;
    mount_detect(&server).await;
    let mut h = harness(Some(llm_for(&server)));
    let user = sign_up(&h).await;
    let epic = h.services.artifacts.create(user, epic_input("Export", None)).await.unwrap();
    let xp_before = h.services.gamification.stats(user).await.unwrap().xp;

    let analysis = h
        .services
        .impact
        .analyze(user, epic.id, "Reports PRD", "Export reports as PDF")
        .await
        .unwrap();
    assert_eq!(analysis.changes.len(), 1);
    assert_eq!(analysis.total_score, 12);
    assert_eq!(analysis.risk_level, RiskLevel::Medium);

    let detail = h.services.impact.get_run(user, analysis.run_id).await.unwrap();
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.run.artifact_id, epic.id);

    let stats = h.services.gamification.stats(user).await.unwrap();
    assert_eq!(stats.xp - xp_before, 25);
    let events = drain_events(&mut h.events);
    assert!(events.iter().any(|e| matches!(
        e,
        RealtimeEvent::ImpactRunCompleted { run_id, .. } if *run_id == analysis.run_id
    )));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_analyze_validates_input_and_owner() {
    let server = MockServer::start().await;
    let h = harness(Some(llm_for(&server)));
    let owner = sign_up(&h).await;
    let other = sign_up(&h).await;
    let epic = h.services.artifacts.create(owner, epic_input("Export", None)).await.unwrap();

    let blank = h.services.impact.analyze(owner, epic.id, "PRD", "   ").await;
    assert!(matches!(blank, Err(ServiceError::InvalidInput(_))));
    let foreign = h.services.impact.analyze(other, epic.id, "PRD", "text").await;
    assert!(matches!(foreign, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn test_drain_requires_gateway() {
    let h = harness(None);
    let result = h.services.impact.drain(None).await;
    assert!(matches!(result, Err(ServiceError::NotConfigured(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_overlapping_drains_store_one_run() {
    let server = MockServer::start().await;
    mount_detect(&server).await;
    let h = harness(Some(llm_for(&server)));
    let user = sign_up(&h).await;
    let epic_id = queued_epic(&h, user).await;

    let (a, b) = tokio::join!(h.services.impact.drain(None), h.services.impact.drain(None));
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.claimed + b.claimed, 1);
    assert_eq!(a.completed + b.completed, 1);

    let runs = h.services.impact.list_runs(user, Some(epic_id), None).await.unwrap();
    assert_eq!(runs.len(), 1);
    let stats = h.services.impact.queue_stats().await.unwrap();
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending + stats.processing, 0);

    let again = h.services.impact.drain(None).await.unwrap();
    assert_eq!(again.claimed, 0);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_drain_skips_deleted_artifact() {
    let server = MockServer::start().await;
    let h = harness(Some(llm_for(&server)));
    let user = sign_up(&h).await;
    let epic_id = queued_epic(&h, user).await;
    h.services.artifacts.delete(user, epic_id).await.unwrap();

    let report = h.services.impact.drain(None).await.unwrap();
    assert_eq!((report.claimed, report.skipped), (1, 1));
    assert_eq!(h.services.impact.queue_stats().await.unwrap().skipped, 1);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_failed_analysis_is_retried_later() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;
    let h = harness(Some(llm_for(&server)));
    let user = sign_up(&h).await;
    queued_epic(&h, user).await;

    let report = h.services.impact.drain(None).await.unwrap();
    assert_eq!((report.claimed, report.failed), (1, 1));

    let queue = h.services.impact.list_queue(user, None).await.unwrap();
    assert_eq!(queue[0].attempts, 1);
    assert!(queue[0].last_error.as_deref().is_some_and(|e| e.contains("400")));
    let stats = h.services.impact.queue_stats().await.unwrap();
    assert_eq!((stats.pending, stats.failed), (1, 0));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn test_generate_report_saves_artifact() {
    let server = MockServer::start().await;
    mount_detect(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("json_object"))
        .respond_with(ResponseTemplate::new(200).set_body_json(content_body(
            "```json\n{\"summary\": \"Export scope changed\", \"findings\": [{\"section\": \"Export\", \
             \"severity\": \"high\", \"recommendation\": \"Re-estimate\"}], \"nextSteps\": [\"Sync with design\"]}\n```",
        )))
        .mount(&server)
        .await;
    let h = harness(Some(llm_for(&server)));
    let user = sign_up(&h).await;
    let epic = h.services.artifacts.create(user, epic_input("Export", None)).await.unwrap();
    let analysis =
        h.services.impact.analyze(user, epic.id, "Reports PRD", "PDF only").await.unwrap();

    let generated = h.services.impact.generate_report(user, analysis.run_id).await.unwrap();
    assert_eq!(generated.report.total_score, 12);
    assert_eq!(generated.report.findings.len(), 1);
    let saved = h.services.artifacts.get(user, generated.artifact_id).await.unwrap();
    assert_eq!(saved.artifact_type, ArtifactType::ImpactReport);
}
