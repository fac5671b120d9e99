use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use pmos_core::{
    ChangeKind, DetectedChange, ImpactQueueItem, ImpactQueueStatus, ImpactRunDetail, Severity,
};
use uuid::Uuid;

use super::{create_test_storage, create_test_user};
use crate::StorageBackend;
use crate::traits::ImpactStore;

fn queue_item(user_id: Uuid, delay_secs: i64) -> ImpactQueueItem {
    ImpactQueueItem::new(
        user_id,
        Uuid::new_v4(),
        None,
        "Checkout PRD",
        "The checkout flow now supports wallets.".to_owned(),
        Utc::now() + Duration::seconds(delay_secs),
    )
    .unwrap()
}

fn detail_for(item: &ImpactQueueItem) -> ImpactRunDetail {
    let changes = vec![DetectedChange {
        section: "Payments".to_owned(),
        change_kind: ChangeKind::Added,
        severity: Severity::High,
        description: "Wallet support".to_owned(),
        suggested_action: None,
    }];
    ImpactRunDetail::build(
        item.user_id,
        item.artifact_id,
        Some(item.id),
        &item.document_name,
        "summary".to_owned(),
        &changes,
    )
}

async fn seeded(storage: &StorageBackend, count: usize) -> Uuid {
    let user = create_test_user(storage).await;
    for _ in 0..count {
        storage.enqueue_impact(&queue_item(user.id, 0)).await.unwrap();
    }
    user.id
}

#[tokio::test]
async fn test_claim_respects_schedule_and_limit() {
    let storage = create_test_storage();
    let user_id = seeded(&storage, 3).await;
    storage.enqueue_impact(&queue_item(user_id, 3600)).await.unwrap();

    let claimed = storage.claim_impact_items(2, 300).await.unwrap();
    assert_eq!(claimed.len(), 2);
    assert!(claimed.iter().all(|i| i.status == ImpactQueueStatus::Processing));

    let rest = storage.claim_impact_items(10, 300).await.unwrap();
    assert_eq!(rest.len(), 1, "future-scheduled row must not be claimed");
    assert!(storage.claim_impact_items(10, 300).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_claims_are_reclaimable() {
    let storage = create_test_storage();
    seeded(&storage, 1).await;
    assert_eq!(storage.claim_impact_items(10, 300).await.unwrap().len(), 1);
    // A zero-second visibility timeout makes every processing row stale.
    assert_eq!(storage.claim_impact_items(10, 0).await.unwrap().len(), 1);
    assert_eq!(storage.release_stale_impact_items(0).await.unwrap(), 1);
}

#[tokio::test]
async fn test_fail_until_parked() {
    let storage = create_test_storage();
    seeded(&storage, 1).await;
    let id = storage.claim_impact_items(1, 300).await.unwrap()[0].id;

    assert_eq!(storage.fail_impact_item(id, "boom").await.unwrap(), ImpactQueueStatus::Pending);
    assert_eq!(storage.fail_impact_item(id, "boom").await.unwrap(), ImpactQueueStatus::Pending);
    assert_eq!(storage.fail_impact_item(id, "boom").await.unwrap(), ImpactQueueStatus::Failed);

    let stats = storage.impact_queue_stats().await.unwrap();
    assert_eq!(stats.failed, 1);
    assert_eq!(storage.retry_failed_impact_items().await.unwrap(), 1);
    let stats = storage.impact_queue_stats().await.unwrap();
    assert_eq!((stats.failed, stats.pending), (0, 1));
}

#[tokio::test]
async fn test_pending_row_absorbs_newer_source_text() {
    let storage = create_test_storage();
    let user = create_test_user(&storage).await;
    let (artifact_id, source_id) = (Uuid::new_v4(), Uuid::new_v4());
    let row = |text: &str, delay_secs: i64| {
        ImpactQueueItem::new(
            user.id,
            artifact_id,
            Some(source_id),
            "Checkout PRD",
            text.to_owned(),
            Utc::now() + Duration::seconds(delay_secs),
        )
        .unwrap()
    };

    assert!(!storage.enqueue_or_merge_impact(&row("v1", 0)).await.unwrap());
    assert!(storage.enqueue_or_merge_impact(&row("v2", 60)).await.unwrap());

    let queue = storage.list_impact_queue(user.id, 10).await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].document_text, "v2");
    assert!(queue[0].scheduled_at > Utc::now(), "merge pushes the schedule back");

    // A claimed row is no longer pending, so the next change queues afresh.
    assert!(storage.enqueue_or_merge_impact(&row("v3", 0)).await.unwrap());
    assert_eq!(storage.claim_impact_items(10, 300).await.unwrap().len(), 1);
    assert!(!storage.enqueue_or_merge_impact(&row("v4", 0)).await.unwrap());
    assert_eq!(storage.list_impact_queue(user.id, 10).await.unwrap().len(), 2);

    // Rows without a source are never merged.
    let mut sourceless = row("manual", 0);
    sourceless.source_artifact_id = None;
    assert!(!storage.enqueue_or_merge_impact(&sourceless).await.unwrap());
    let mut again = row("manual", 0);
    again.source_artifact_id = None;
    assert!(!storage.enqueue_or_merge_impact(&again).await.unwrap());
    assert_eq!(storage.list_impact_queue(user.id, 10).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_clear_failed() {
    let storage = create_test_storage();
    seeded(&storage, 2).await;
    let claimed = storage.claim_impact_items(1, 300).await.unwrap();
    for _ in 0..3 {
        storage.fail_impact_item(claimed[0].id, "boom").await.unwrap();
    }
    assert_eq!(storage.clear_failed_impact_items().await.unwrap(), 1);
    assert_eq!(storage.impact_queue_stats().await.unwrap().total(), 1);
}

#[tokio::test]
async fn test_one_run_per_queue_row() {
    let storage = create_test_storage();
    let user_id = seeded(&storage, 1).await;
    let item = storage.claim_impact_items(1, 300).await.unwrap().remove(0);

    assert!(storage.save_impact_run(&detail_for(&item)).await.unwrap());
    assert!(!storage.save_impact_run(&detail_for(&item)).await.unwrap());

    let runs = storage.list_impact_runs(user_id, None, 10).await.unwrap();
    assert_eq!(runs.len(), 1);
    let detail = storage.get_impact_run(runs[0].id).await.unwrap().unwrap();
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.run.total_score, 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_claims_never_share_rows() {
    let storage = Arc::new(create_test_storage());
    seeded(&storage, 20).await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let storage = Arc::clone(&storage);
            tokio::spawn(async move { storage.claim_impact_items(10, 300).await.unwrap() })
        })
        .collect();
    let mut seen = HashSet::new();
    let mut total = 0;
    for handle in handles {
        for item in handle.await.unwrap() {
            total += 1;
            assert!(seen.insert(item.id), "row {} claimed twice", item.id);
        }
    }
    assert_eq!(total, 20);
}
