//! Markdown rendering of threat models and roadmaps.
//!
//! Rendered documents follow the same shape as the embedded templates so
//! they pass the lint in [`super::lint`].

use std::collections::BTreeMap;

use chrono::Utc;

use super::lint::{METRICS_COLUMNS, STRIDE_COLUMNS, STRIDE_SECTION};
use crate::roadmap::{Initiative, RoadmapExport, Status};
use crate::stride::{RiskLevel, StrideCategory, ThreatModel, NO_DATA_FLOW};

/// Placeholder for values an analyst still has to fill in.
const TO_BE_ASSESSED: &str = "TBD";

/// Free-text component details shown at the top of a threat model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    /// Component name.
    pub name: String,
    /// What the component does.
    pub description: String,
    /// Data classification, e.g. `Internal`.
    pub data_classification: String,
    /// Review date, `YYYY-MM-DD`.
    pub date: String,
}

impl ComponentInfo {
    /// Details for `name` dated today, with placeholder description.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: TO_BE_ASSESSED.to_string(),
            data_classification: "Internal".to_string(),
            date: Utc::now().format("%Y-%m-%d").to_string(),
        }
    }
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn table_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

fn table_header(columns: &[&str]) -> [String; 2] {
    [
        format!("| {} |", columns.join(" | ")),
        format!("|{}", "---|".repeat(columns.len())),
    ]
}

/// Render a threat model as Markdown.
#[must_use]
pub fn render_threat_model(model: &ThreatModel, info: &ComponentInfo) -> String {
    let mut lines = vec![
        format!("# Threat Model: {}", info.name),
        String::new(),
        "## Component Information".to_string(),
        String::new(),
        format!("- **Name**: {}", info.name),
        format!("- **Description**: {}", info.description),
        format!("- **Data Classification**: {}", info.data_classification),
        format!("- **Date**: {}", info.date),
        String::new(),
        "## Data Flow Diagram".to_string(),
        String::new(),
        "```".to_string(),
    ];

    let mut flows: Vec<&str> = model
        .threats
        .iter()
        .map(|t| t.data_flow.as_str())
        .filter(|flow| *flow != NO_DATA_FLOW)
        .collect();
    flows.dedup();
    lines.push(format!("[{}]", model.component));
    lines.extend(flows.iter().map(|flow| format!("    |-- {flow}")));
    lines.push("```".to_string());

    lines.push(String::new());
    lines.push(format!("## {STRIDE_SECTION}"));

    for category in StrideCategory::ALL {
        lines.push(String::new());
        lines.push(format!("### {}", category.name()));
        lines.push(String::new());
        lines.extend(table_header(&STRIDE_COLUMNS));

        let mut threats = model.threats_in(category).peekable();
        if threats.peek().is_none() {
            lines.push(table_row(&STRIDE_COLUMNS.map(|_| String::new())));
        }
        for threat in threats {
            let mitigation = model
                .mitigations
                .get(&threat.id)
                .map_or_else(|| threat.status.clone(), |m| m.join("; "));
            lines.push(table_row(&[
                cell(&format!("{}: {}", threat.id, threat.description)),
                TO_BE_ASSESSED.to_string(),
                threat.risk_level.name().to_string(),
                cell(&mitigation),
            ]));
        }
    }

    lines.push(String::new());
    lines.push("## Risk Summary".to_string());
    lines.push(String::new());
    for risk in [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low] {
        lines.push(format!("- **{}**: {}", risk.name(), model.count_at(risk)));
    }

    lines.extend([
        String::new(),
        "## Approval".to_string(),
        String::new(),
        "- **Reviewer**: [Name]".to_string(),
        "- **Date**: [YYYY-MM-DD]".to_string(),
    ]);

    lines.join("\n") + "\n"
}

fn checklist_item(initiative: &Initiative) -> String {
    let mark = if initiative.status == Status::Completed { 'x' } else { ' ' };
    let mut item = format!(
        "- [{mark}] {} {} ({}, {}): {}",
        initiative.id,
        initiative.name,
        initiative.priority,
        initiative.status,
        initiative.description
    );
    if !initiative.dependencies.is_empty() {
        item.push_str(&format!(" [depends on {}]", initiative.dependencies.join(", ")));
    }
    item
}

/// Render a roadmap export as Markdown, one phase per target quarter.
#[must_use]
pub fn render_roadmap(export: &RoadmapExport) -> String {
    let mut lines = vec![
        "# Security Roadmap".to_string(),
        String::new(),
        format!("Last updated: {}", export.last_updated),
    ];

    let mut by_quarter: BTreeMap<&str, Vec<&Initiative>> = BTreeMap::new();
    let mut unscheduled = Vec::new();
    for initiative in &export.initiatives {
        match initiative.target_quarter.as_deref() {
            Some(quarter) => by_quarter.entry(quarter).or_default().push(initiative),
            None => unscheduled.push(initiative),
        }
    }

    let mut phases: Vec<(String, Vec<&Initiative>)> = by_quarter
        .into_iter()
        .enumerate()
        .map(|(index, (quarter, items))| (format!("Phase {}: {quarter}", index + 1), items))
        .collect();
    if !unscheduled.is_empty() {
        phases.push(("Unscheduled".to_string(), unscheduled));
    }

    for (title, initiatives) in phases {
        lines.push(String::new());
        lines.push(format!("## {title}"));
        lines.push(String::new());
        for initiative in initiatives {
            lines.push(checklist_item(initiative));
            for milestone in export
                .milestones
                .iter()
                .filter(|m| m.initiative_id == initiative.id)
            {
                let mark = if milestone.completed { 'x' } else { ' ' };
                let due = milestone
                    .due_date
                    .as_deref()
                    .map(|d| format!(" (due {d})"))
                    .unwrap_or_default();
                lines.push(format!("  - [{mark}] {} {}{due}", milestone.id, milestone.milestone));
            }
        }
    }

    lines.push(String::new());
    lines.push("## Metrics".to_string());
    lines.push(String::new());
    lines.extend(table_header(&METRICS_COLUMNS));
    for metric in export.metrics() {
        lines.push(table_row(&[
            cell(metric.metric),
            metric.target,
            metric.current,
        ]));
    }

    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::{lint_roadmap, lint_threat_model};
    use crate::roadmap::{NewInitiative, Roadmap};
    use crate::stride::ThreatModelingFramework;

    fn model() -> ThreatModel {
        let mut framework = ThreatModelingFramework::new("Payments API");
        framework.identify_threats(None, Some("Checkout -> Ledger"));
        framework.add_mitigation("T-0002", "Short-lived tokens | rotation");
        framework.threat_model()
    }

    #[test]
    fn test_rendered_threat_model_passes_lint() {
        let markdown = render_threat_model(&model(), &ComponentInfo::new("Payments API"));
        let report = lint_threat_model(&markdown);
        assert!(report.is_clean(), "{:?}", report.issues);
    }

    #[test]
    fn test_rendered_threat_model_contents() {
        let markdown = render_threat_model(&model(), &ComponentInfo::new("Payments API"));

        assert!(markdown.starts_with("# Threat Model: Payments API\n"));
        assert!(markdown.contains("    |-- Checkout -> Ledger"));
        assert!(markdown
            .contains("| T-0001: Authentication mechanism bypass | TBD | Medium | Open |"));
        assert!(markdown.contains("Short-lived tokens \\| rotation"));
        assert!(markdown.contains("- **High**: 3"));
        assert!(markdown.contains("- **Medium**: 20"));
        assert!(markdown.contains("- **Low**: 0"));
    }

    #[test]
    fn test_empty_model_still_passes_lint() {
        let mut empty = model();
        empty.threats.clear();
        let markdown = render_threat_model(&empty, &ComponentInfo::new("Nothing"));
        assert!(lint_threat_model(&markdown).is_clean());
    }

    #[test]
    fn test_rendered_roadmap_passes_lint() {
        let markdown = render_roadmap(&Roadmap::default_roadmap().export());
        let report = lint_roadmap(&markdown);
        assert!(report.is_clean(), "{:?}", report.issues);
    }

    #[test]
    fn test_rendered_roadmap_groups_by_quarter() {
        let mut roadmap = Roadmap::default_roadmap();
        roadmap.update_status("I-001", Status::Completed);
        roadmap
            .add_initiative(
                NewInitiative::new("Bug bounty", "Launch a program").depends_on("I-004"),
            )
            .unwrap();
        roadmap
            .add_milestone("I-002", "Template adopted", Some("2026-03-31".to_string()))
            .unwrap();

        let markdown = render_roadmap(&roadmap.export());

        assert!(markdown.contains("## Phase 1: Q1"));
        assert!(markdown.contains("## Phase 3: Q3"));
        assert!(markdown.contains("## Unscheduled"));
        assert!(markdown.contains("- [x] I-001 Automated Security Scanning (High, Completed)"));
        assert!(markdown.contains("  - [ ] M-001 Template adopted (due 2026-03-31)"));
        assert!(markdown.contains("[depends on I-004]"));
        assert!(markdown.contains("| Initiatives completed | 6 | 1 |"));
        assert!(markdown.find("## Unscheduled") < markdown.find("## Metrics"));
    }
}
