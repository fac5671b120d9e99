//! Impact analysis: queue rows, detected changes and their scoring.
//!
//! Scores come from a fixed `(change kind, severity)` table. A run's risk
//! level is derived from the summed score, with critical items forcing at
//! least `high`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::MAX_DOCUMENT_CHARS;
use crate::error::{CoreError, require_text};

text_enum! {
    pub enum ChangeKind("change kind") {
        Added => "added",
        Removed => "removed",
        Modified => "modified",
        Clarified => "clarified",
    }
}

text_enum! {
    pub enum Severity("severity") {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

text_enum! {
    pub enum RiskLevel("risk level") {
        None => "none",
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

impl ChangeKind {
    /// Score of a single change of this kind at `severity`.
    #[must_use]
    pub const fn score(&self, severity: Severity) -> i64 {
        let row: [i64; 4] = match *self {
            Self::Added | Self::Modified => [1, 3, 6, 10],
            Self::Removed => [2, 6, 12, 20],
            Self::Clarified => [1, 1, 2, 3],
        };
        row[severity as usize]
    }
}

impl RiskLevel {
    #[must_use]
    pub const fn from_score(total: i64, has_critical: bool) -> Self {
        let level = match total {
            i64::MIN..=0 => Self::None,
            1..=5 => Self::Low,
            6..=15 => Self::Medium,
            16..=30 => Self::High,
            _ => Self::Critical,
        };
        if has_critical && (level as u8) < (Self::High as u8) { Self::High } else { level }
    }
}

/// One change as reported by the model, before it is scored and stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetectedChange {
    pub section: String,
    pub change_kind: ChangeKind,
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub suggested_action: Option<String>,
}

impl DetectedChange {
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.change_kind.score(self.severity)
    }
}

/// Total score and risk for a set of changes.
#[must_use]
pub fn score_changes(changes: &[DetectedChange]) -> (i64, RiskLevel) {
    let total = changes.iter().map(DetectedChange::score).sum();
    let has_critical = changes.iter().any(|c| c.severity == Severity::Critical);
    (total, RiskLevel::from_score(total, has_critical))
}

text_enum! {
    pub enum ImpactQueueStatus("impact queue status") {
        Pending => "pending",
        Processing => "processing",
        Completed => "completed",
        Skipped => "skipped",
        Failed => "failed",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactQueueItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub artifact_id: Uuid,
    pub source_artifact_id: Option<Uuid>,
    pub document_name: String,
    pub document_text: String,
    pub status: ImpactQueueStatus,
    pub attempts: i32,
    pub scheduled_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ImpactQueueItem {
    /// New pending row that becomes claimable at `scheduled_at`.
    ///
    /// # Errors
    /// Returns `CoreError::Validation` for a blank name or document, or a
    /// document longer than `MAX_DOCUMENT_CHARS`.
    pub fn new(
        user_id: Uuid,
        artifact_id: Uuid,
        source_artifact_id: Option<Uuid>,
        document_name: &str,
        document_text: String,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        require_text("documentName", document_name, 300)?;
        require_text("documentText", &document_text, MAX_DOCUMENT_CHARS)?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            artifact_id,
            source_artifact_id,
            document_name: document_name.trim().to_owned(),
            document_text,
            status: ImpactQueueStatus::Pending,
            attempts: 0,
            scheduled_at,
            claimed_at: None,
            completed_at: None,
            last_error: None,
            created_at: Utc::now(),
        })
    }

    /// Whether a drain at `now` may claim this row.
    #[must_use]
    pub fn is_claimable(&self, now: DateTime<Utc>, visibility_timeout_secs: i64) -> bool {
        match self.status {
            ImpactQueueStatus::Pending => self.scheduled_at <= now,
            ImpactQueueStatus::Processing => self
                .claimed_at
                .is_none_or(|at| (now - at).num_seconds() >= visibility_timeout_secs),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRun {
    pub id: Uuid,
    pub user_id: Uuid,
    pub artifact_id: Uuid,
    pub queue_id: Option<Uuid>,
    pub document_name: String,
    pub total_score: i64,
    pub risk_level: RiskLevel,
    pub summary: String,
    pub item_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactItem {
    pub id: Uuid,
    pub run_id: Uuid,
    pub section: String,
    pub change_kind: ChangeKind,
    pub severity: Severity,
    pub score: i64,
    pub description: String,
    pub suggested_action: Option<String>,
}

/// A run together with its scored items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRunDetail {
    pub run: ImpactRun,
    pub items: Vec<ImpactItem>,
}

impl ImpactRunDetail {
    /// Score `changes` and build the run plus one item per change.
    #[must_use]
    pub fn build(
        user_id: Uuid,
        artifact_id: Uuid,
        queue_id: Option<Uuid>,
        document_name: &str,
        summary: String,
        changes: &[DetectedChange],
    ) -> Self {
        let (total_score, risk_level) = score_changes(changes);
        let run_id = Uuid::new_v4();
        let items = changes
            .iter()
            .map(|c| ImpactItem {
                id: Uuid::new_v4(),
                run_id,
                section: c.section.clone(),
                change_kind: c.change_kind,
                severity: c.severity,
                score: c.score(),
                description: c.description.clone(),
                suggested_action: c.suggested_action.clone(),
            })
            .collect::<Vec<_>>();
        let run = ImpactRun {
            id: run_id,
            user_id,
            artifact_id,
            queue_id,
            document_name: document_name.to_owned(),
            total_score,
            risk_level,
            summary,
            item_count: i32::try_from(items.len()).unwrap_or(i32::MAX),
            created_at: Utc::now(),
        };
        Self { run, items }
    }
}

/// Outcome of one queue drain.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DrainReport {
    pub claimed: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactQueueStats {
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub skipped: i64,
    pub failed: i64,
}

impl ImpactQueueStats {
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.pending + self.processing + self.completed + self.skipped + self.failed
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn change(kind: ChangeKind, severity: Severity) -> DetectedChange {
        DetectedChange {
            section: "Scope".to_owned(),
            change_kind: kind,
            severity,
            description: "changed".to_owned(),
            suggested_action: None,
        }
    }

    #[test]
    fn score_table() {
        assert_eq!(ChangeKind::Added.score(Severity::Low), 1);
        assert_eq!(ChangeKind::Added.score(Severity::Critical), 10);
        assert_eq!(ChangeKind::Removed.score(Severity::Medium), 6);
        assert_eq!(ChangeKind::Removed.score(Severity::Critical), 20);
        assert_eq!(ChangeKind::Modified.score(Severity::High), 6);
        assert_eq!(ChangeKind::Clarified.score(Severity::Medium), 1);
        assert_eq!(ChangeKind::Clarified.score(Severity::Critical), 3);
    }

    #[test]
    fn risk_thresholds() {
        assert_eq!(RiskLevel::from_score(0, false), RiskLevel::None);
        assert_eq!(RiskLevel::from_score(5, false), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(6, false), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(15, false), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(16, false), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(30, false), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(31, false), RiskLevel::Critical);
    }

    #[test]
    fn critical_item_forces_high() {
        let changes = vec![change(ChangeKind::Clarified, Severity::Critical)];
        assert_eq!(score_changes(&changes), (3, RiskLevel::High));
        let many = vec![change(ChangeKind::Removed, Severity::Critical); 2];
        assert_eq!(score_changes(&many), (40, RiskLevel::Critical));
        assert_eq!(score_changes(&[]), (0, RiskLevel::None));
    }

    #[test]
    fn build_links_items_to_run() {
        let changes = vec![
            change(ChangeKind::Added, Severity::Medium),
            change(ChangeKind::Removed, Severity::High),
        ];
        let detail =
            ImpactRunDetail::build(Uuid::new_v4(), Uuid::new_v4(), None, "PRD", "two changes".to_owned(), &changes);
        assert_eq!(detail.run.total_score, 15);
        assert_eq!(detail.run.risk_level, RiskLevel::Medium);
        assert_eq!(detail.run.item_count, 2);
        assert!(detail.items.iter().all(|i| i.run_id == detail.run.id));
    }

    #[test]
    fn claimability() {
        let now = Utc::now();
        let mut item = ImpactQueueItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            "PRD",
            "text".to_owned(),
            now + Duration::seconds(60),
        )
        .unwrap();
        assert!(!item.is_claimable(now, 300));
        assert!(item.is_claimable(now + Duration::seconds(60), 300));

        item.status = ImpactQueueStatus::Processing;
        item.claimed_at = Some(now);
        assert!(!item.is_claimable(now + Duration::seconds(10), 300));
        assert!(item.is_claimable(now + Duration::seconds(301), 300));

        item.status = ImpactQueueStatus::Failed;
        assert!(!item.is_claimable(now + Duration::days(1), 300));
    }

    #[test]
    fn blank_document_is_rejected() {
        let err = ImpactQueueItem::new(Uuid::new_v4(), Uuid::new_v4(), None, "PRD", "  ".to_owned(), Utc::now())
            .unwrap_err();
        assert!(err.to_string().contains("documentText"));
    }
}
