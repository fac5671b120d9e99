//! Document bodies for the non-story artifact kinds.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::story::Priority;
use crate::error::{CoreError, require_items, require_text};
use crate::impact::{RiskLevel, Severity};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Epic {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
}

impl Epic {
    /// # Errors
    /// Returns `CoreError::Validation` for blank or overlong fields.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("epic.title", &self.title, 200)?;
        require_text("epic.description", &self.description, 5000)?;
        require_items("epic.acceptanceCriteria", &self.acceptance_criteria, 0, 30)
    }

    pub(crate) fn to_plain_text(&self) -> String {
        let mut out = format!("Epic: {}\n{}", self.title, self.description);
        for criterion in &self.acceptance_criteria {
            let _ = write!(out, "\n  - {criterion}");
        }
        out
    }
}

/// Lean canvas, one list per box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeanCanvas {
    pub product_name: String,
    pub problem: Vec<String>,
    pub customer_segments: Vec<String>,
    pub unique_value_proposition: String,
    pub solution: Vec<String>,
    pub channels: Vec<String>,
    pub revenue_streams: Vec<String>,
    pub cost_structure: Vec<String>,
    pub key_metrics: Vec<String>,
    pub unfair_advantage: String,
}

impl LeanCanvas {
    pub(crate) fn validate(&self) -> Result<(), CoreError> {
        require_text("canvas.productName", &self.product_name, 200)?;
        require_text("canvas.uniqueValueProposition", &self.unique_value_proposition, 1000)?;
        require_text("canvas.unfairAdvantage", &self.unfair_advantage, 1000)?;
        require_items("canvas.problem", &self.problem, 1, 10)?;
        require_items("canvas.customerSegments", &self.customer_segments, 1, 10)?;
        require_items("canvas.solution", &self.solution, 1, 10)?;
        require_items("canvas.channels", &self.channels, 0, 10)?;
        require_items("canvas.revenueStreams", &self.revenue_streams, 0, 10)?;
        require_items("canvas.costStructure", &self.cost_structure, 0, 10)?;
        require_items("canvas.keyMetrics", &self.key_metrics, 0, 10)
    }

    pub(super) fn to_plain_text(&self) -> String {
        let sections: [(&str, &[String]); 7] = [
            ("Problem", &self.problem),
            ("Customer segments", &self.customer_segments),
            ("Solution", &self.solution),
            ("Channels", &self.channels),
            ("Revenue streams", &self.revenue_streams),
            ("Cost structure", &self.cost_structure),
            ("Key metrics", &self.key_metrics),
        ];
        let mut out = format!(
            "Lean canvas: {}\nUnique value proposition: {}\nUnfair advantage: {}",
            self.product_name, self.unique_value_proposition, self.unfair_advantage
        );
        for (heading, items) in sections {
            push_list(&mut out, heading, items);
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrdRequirement {
    pub id: String,
    pub description: String,
    pub priority: Priority,
}

pub const MAX_PRD_REQUIREMENTS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Prd {
    pub product_name: String,
    pub summary: String,
    pub problem: String,
    #[serde(default)]
    pub target_users: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    pub requirements: Vec<PrdRequirement>,
    #[serde(default)]
    pub success_metrics: Vec<String>,
    #[serde(default)]
    pub out_of_scope: Vec<String>,
}

impl Prd {
    pub(crate) fn validate(&self) -> Result<(), CoreError> {
        require_text("prd.productName", &self.product_name, 200)?;
        require_text("prd.summary", &self.summary, 5000)?;
        require_text("prd.problem", &self.problem, 5000)?;
        require_items("prd.targetUsers", &self.target_users, 0, 20)?;
        require_items("prd.goals", &self.goals, 0, 20)?;
        require_items("prd.successMetrics", &self.success_metrics, 0, 20)?;
        require_items("prd.outOfScope", &self.out_of_scope, 0, 20)?;
        if self.requirements.is_empty() {
            return Err(CoreError::invalid("prd.requirements", "needs at least one requirement"));
        }
        if self.requirements.len() > MAX_PRD_REQUIREMENTS {
            return Err(CoreError::invalid(
                "prd.requirements",
                format!("has more than {MAX_PRD_REQUIREMENTS} entries"),
            ));
        }
        for (i, req) in self.requirements.iter().enumerate() {
            require_text(&format!("prd.requirements[{i}].id"), &req.id, 40)?;
            require_text(&format!("prd.requirements[{i}].description"), &req.description, 2000)?;
        }
        Ok(())
    }

    pub(super) fn to_plain_text(&self) -> String {
        let mut out = format!(
            "PRD: {}\nSummary: {}\nProblem: {}",
            self.product_name, self.summary, self.problem
        );
        push_list(&mut out, "Target users", &self.target_users);
        push_list(&mut out, "Goals", &self.goals);
        out.push_str("\nRequirements:");
        for req in &self.requirements {
            let _ = write!(out, "\n  - [{}] ({}) {}", req.id, req.priority, req.description);
        }
        push_list(&mut out, "Success metrics", &self.success_metrics);
        push_list(&mut out, "Out of scope", &self.out_of_scope);
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapQuarter {
    pub label: String,
    pub theme: String,
    pub initiatives: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub product_name: String,
    pub quarters: Vec<RoadmapQuarter>,
}

impl Roadmap {
    pub(crate) fn validate(&self) -> Result<(), CoreError> {
        require_text("roadmap.productName", &self.product_name, 200)?;
        if self.quarters.is_empty() {
            return Err(CoreError::invalid("roadmap.quarters", "needs at least one quarter"));
        }
        for (i, quarter) in self.quarters.iter().enumerate() {
            require_text(&format!("roadmap.quarters[{i}].label"), &quarter.label, 40)?;
            require_text(&format!("roadmap.quarters[{i}].theme"), &quarter.theme, 200)?;
            require_items(&format!("roadmap.quarters[{i}].initiatives"), &quarter.initiatives, 1, 15)?;
        }
        Ok(())
    }

    pub(super) fn to_plain_text(&self) -> String {
        let mut out = format!("Roadmap: {}", self.product_name);
        for quarter in &self.quarters {
            push_list(&mut out, &format!("{} ({})", quarter.label, quarter.theme), &quarter.initiatives);
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactFinding {
    pub section: String,
    pub severity: Severity,
    pub recommendation: String,
}

/// Narrative report generated from one impact run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    pub run_id: Uuid,
    pub artifact_id: Uuid,
    pub document_name: String,
    pub risk_level: RiskLevel,
    pub total_score: i64,
    pub summary: String,
    #[serde(default)]
    pub findings: Vec<ImpactFinding>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

impl ImpactReport {
    pub(crate) fn validate(&self) -> Result<(), CoreError> {
        require_text("report.documentName", &self.document_name, 300)?;
        require_text("report.summary", &self.summary, 10_000)?;
        require_items("report.nextSteps", &self.next_steps, 0, 20)?;
        if self.total_score < 0 {
            return Err(CoreError::invalid("report.totalScore", "must not be negative"));
        }
        for (i, finding) in self.findings.iter().enumerate() {
            require_text(&format!("report.findings[{i}].section"), &finding.section, 300)?;
            require_text(
                &format!("report.findings[{i}].recommendation"),
                &finding.recommendation,
                2000,
            )?;
        }
        Ok(())
    }

    pub(super) fn to_plain_text(&self) -> String {
        let mut out = format!(
            "Impact report for {} (risk {}, score {})\n{}",
            self.document_name, self.risk_level, self.total_score, self.summary
        );
        for finding in &self.findings {
            let _ = write!(
                out,
                "\n  - [{}] {}: {}",
                finding.severity, finding.section, finding.recommendation
            );
        }
        push_list(&mut out, "Next steps", &self.next_steps);
        out
    }
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = write!(out, "\n{heading}:");
    for item in items {
        let _ = write!(out, "\n  - {item}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prd_requires_requirements() {
        let mut prd = Prd {
            product_name: "Pulse".to_owned(),
            summary: "Team health check-ins".to_owned(),
            problem: "Managers notice burnout too late".to_owned(),
            target_users: vec!["Engineering managers".to_owned()],
            goals: vec![],
            requirements: vec![],
            success_metrics: vec![],
            out_of_scope: vec![],
        };
        assert!(prd.validate().is_err());
        prd.requirements.push(PrdRequirement {
            id: "R1".to_owned(),
            description: "Weekly pulse survey".to_owned(),
            priority: Priority::High,
        });
        assert!(prd.validate().is_ok());
        let text = prd.to_plain_text();
        assert!(text.contains("[R1] (high) Weekly pulse survey"));
        assert!(text.contains("Target users:"));
        assert!(!text.contains("Goals:"));
    }

    #[test]
    fn prd_requirement_count_is_capped() {
        let requirement = |i: usize| PrdRequirement {
            id: format!("R{i}"),
            description: "Export to CSV".to_owned(),
            priority: Priority::Medium,
        };
        let mut prd = Prd {
            product_name: "Pulse".to_owned(),
            summary: "Team health check-ins".to_owned(),
            problem: "Managers notice burnout too late".to_owned(),
            target_users: vec![],
            goals: vec![],
            requirements: (0..MAX_PRD_REQUIREMENTS).map(requirement).collect(),
            success_metrics: vec![],
            out_of_scope: vec![],
        };
        assert!(prd.validate().is_ok());
        prd.requirements.push(requirement(MAX_PRD_REQUIREMENTS));
        let err = prd.validate().unwrap_err();
        assert!(err.to_string().contains("prd.requirements"));
    }

    #[test]
    fn roadmap_quarter_needs_initiatives() {
        let roadmap = Roadmap {
            product_name: "Pulse".to_owned(),
            quarters: vec![RoadmapQuarter {
                label: "Q1".to_owned(),
                theme: "Launch".to_owned(),
                initiatives: vec![],
            }],
        };
        let err = roadmap.validate().unwrap_err();
        assert!(err.to_string().contains("roadmap.quarters[0].initiatives"));
    }

    #[test]
    fn blank_list_entries_are_reported_with_index() {
        let epic = Epic {
            title: "Search".to_owned(),
            description: "Find anything".to_owned(),
            acceptance_criteria: vec!["Fast".to_owned(), "  ".to_owned()],
        };
        let err = epic.validate().unwrap_err();
        assert!(err.to_string().contains("epic.acceptanceCriteria[1]"));
    }
}
