//! Change detection between an artifact and an updated document, and the
//! narrative report written from a scored run.

use pmos_core::{
    ChangeKind, DetectedChange, ImpactFinding, ImpactRunDetail, MAX_DOCUMENT_CHARS, Severity,
};
use serde::Deserialize;
use serde_json::json;

use crate::ai_types::{Message, Tool};
use crate::client::{LlmClient, truncate};
use crate::error::LlmError;

const DETECT_PROMPT: &str = "You are a meticulous product analyst. Given an existing artifact \
and an updated source document, you list every change in the document that affects the \
artifact. Ignore wording changes that do not change meaning.";

const REPORT_PROMPT: &str = "You are a product lead writing a short impact report for your team. \
Respond with a single JSON object and nothing else.";

/// Model output of change detection, with kinds and severities already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub summary: String,
    pub changes: Vec<DetectedChange>,
}

#[derive(Deserialize)]
struct DetectArgs {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    changes: Vec<RawChange>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChange {
    #[serde(default)]
    section: String,
    #[serde(default)]
    change_kind: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    suggested_action: Option<String>,
}

impl RawChange {
    /// `None` when the change has no description. Unknown kinds count as
    /// `modified`, unknown severities as `medium`.
    fn into_change(self) -> Option<DetectedChange> {
        let description = self.description.trim().to_owned();
        if description.is_empty() {
            return None;
        }
        let section = match self.section.trim() {
            "" => "General".to_owned(),
            s => s.to_owned(),
        };
        Some(DetectedChange {
            section,
            change_kind: self.change_kind.parse().unwrap_or(ChangeKind::Modified),
            severity: self.severity.parse().unwrap_or(Severity::Medium),
            description,
            suggested_action: self
                .suggested_action
                .map(|a| a.trim().to_owned())
                .filter(|a| !a.is_empty()),
        })
    }
}

/// Narrative parts of an impact report. Scores come from the run itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    pub summary: String,
    #[serde(default)]
    pub findings: Vec<ImpactFinding>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

fn detect_tool() -> Tool {
    Tool::function(
        "report_changes",
        "Report the changes that affect the artifact.",
        json!({
            "type": "object",
            "properties": {
                "summary": {"type": "string"},
                "changes": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "section": {"type": "string"},
                            "changeKind": {"type": "string", "enum": ["added", "removed", "modified", "clarified"]},
                            "severity": {"type": "string", "enum": ["low", "medium", "high", "critical"]},
                            "description": {"type": "string"},
                            "suggestedAction": {"type": "string"}
                        },
                        "required": ["section", "changeKind", "severity", "description"]
                    }
                }
            },
            "required": ["summary", "changes"]
        }),
    )
}

impl LlmClient {
    /// Compare `artifact_text` with the updated `document_text`.
    ///
    /// # Errors
    /// Gateway failures or unparsable tool arguments.
    pub async fn detect_changes(
        &self,
        artifact_text: &str,
        document_name: &str,
        document_text: &str,
    ) -> Result<ChangeSet, LlmError> {
        let prompt = format!(
            "Existing artifact:\n{}\n\nUpdated document \"{document_name}\":\n{}",
            truncate(artifact_text, MAX_DOCUMENT_CHARS),
            truncate(document_text, MAX_DOCUMENT_CHARS),
        );
        let request = self.request(vec![Message::system(DETECT_PROMPT), Message::user(prompt)]);
        let args: DetectArgs = self.tool_completion(request, detect_tool()).await?;

        let total = args.changes.len();
        let changes: Vec<DetectedChange> =
            args.changes.into_iter().filter_map(RawChange::into_change).collect();
        if changes.len() < total {
            tracing::debug!(dropped = total - changes.len(), "dropped changes without description");
        }
        let summary = match args.summary.trim() {
            "" => format!("{} change(s) detected in {document_name}", changes.len()),
            s => s.to_owned(),
        };
        Ok(ChangeSet { summary, changes })
    }

    /// Write the narrative for a stored run.
    ///
    /// # Errors
    /// Gateway failures or a response with no parsable JSON object.
    pub async fn write_impact_report(
        &self,
        detail: &ImpactRunDetail,
    ) -> Result<ReportDraft, LlmError> {
        let mut prompt = format!(
            "Document: {}\nRisk level: {}\nTotal score: {}\nAnalysis summary: {}\n\nChanges:",
            detail.run.document_name,
            detail.run.risk_level,
            detail.run.total_score,
            detail.run.summary
        );
        for item in &detail.items {
            prompt.push_str(&format!(
                "\n- [{} / {}] {}: {}",
                item.change_kind, item.severity, item.section, item.description
            ));
        }
        prompt.push_str(
            "\n\nReturn JSON: {\"summary\": \"...\", \"findings\": [{\"section\": \"...\", \
             \"severity\": \"low|medium|high|critical\", \"recommendation\": \"...\"}], \
             \"nextSteps\": [\"...\"]}",
        );

        let request = self.request(vec![Message::system(REPORT_PROMPT), Message::user(prompt)]);
        let draft: ReportDraft = self.json_completion(request, "impact report").await?;
        if draft.summary.trim().is_empty() {
            return Err(LlmError::InvalidOutput("impact report summary is empty".to_owned()));
        }
        Ok(draft)
    }
}
