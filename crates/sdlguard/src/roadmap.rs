//! Security roadmap and continuous improvement tracking.
//!
//! A [`Roadmap`] holds prioritized improvement initiatives and the
//! milestones that track them. It is an in-memory model; persistence
//! lives in [`crate::storage::RoadmapStore`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::report;

/// Initiative priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Drop everything.
    Critical,
    /// Next in line.
    High,
    /// Planned work.
    Medium,
    /// Opportunistic.
    Low,
}

impl Priority {
    /// All priorities, most urgent first.
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::invalid_value("priority", s, "Critical, High, Medium, Low"))
    }
}

/// Initiative lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Not started.
    Planned,
    /// Being worked on.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Done.
    Completed,
    /// Postponed.
    Deferred,
}

impl Status {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Planned,
        Self::InProgress,
        Self::Completed,
        Self::Deferred,
    ];

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Deferred => "Deferred",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Status {
    type Err = Error;

    /// Accepts display names case-insensitively, with `-` or `_` in place of spaces.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().replace(['-', '_'], " ");
        Self::ALL
            .into_iter()
            .find(|st| st.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| {
                Error::invalid_value("status", s, "Planned, In Progress, Completed, Deferred")
            })
    }
}

/// A security improvement initiative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    /// Sequential identifier, `I-001` onward.
    pub id: String,
    /// Short name.
    pub name: String,
    /// What the initiative delivers.
    pub description: String,
    /// Priority.
    pub priority: Priority,
    /// Current status.
    pub status: Status,
    /// Target quarter, e.g. `Q1`.
    pub target_quarter: Option<String>,
    /// IDs of initiatives this one depends on.
    pub dependencies: Vec<String>,
    /// When the initiative was added.
    pub created: DateTime<Utc>,
    /// When the initiative was completed.
    pub completed_date: Option<DateTime<Utc>>,
}

/// A checkpoint within an initiative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Sequential identifier, `M-001` onward.
    pub id: String,
    /// The initiative this milestone belongs to.
    pub initiative_id: String,
    /// What must be achieved.
    pub milestone: String,
    /// Free-form due date.
    pub due_date: Option<String>,
    /// Whether the milestone is done.
    pub completed: bool,
}

/// Fields for a new initiative.
#[derive(Debug, Clone)]
pub struct NewInitiative {
    /// Short name.
    pub name: String,
    /// What the initiative delivers.
    pub description: String,
    /// Priority, High unless stated.
    pub priority: Priority,
    /// Target quarter.
    pub target_quarter: Option<String>,
    /// IDs of prerequisite initiatives.
    pub dependencies: Vec<String>,
}

impl NewInitiative {
    /// A High priority initiative with no quarter or dependencies.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            priority: Priority::High,
            target_quarter: None,
            dependencies: Vec::new(),
        }
    }

    /// Set the priority.
    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the target quarter.
    #[must_use]
    pub fn quarter(mut self, quarter: impl Into<String>) -> Self {
        self.target_quarter = Some(quarter.into());
        self
    }

    /// Add a prerequisite initiative.
    #[must_use]
    pub fn depends_on(mut self, initiative_id: impl Into<String>) -> Self {
        self.dependencies.push(initiative_id.into());
        self
    }
}

/// Aggregated counts included in exports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapSummary {
    /// Number of initiatives.
    pub total_initiatives: usize,
    /// Initiatives per priority.
    pub by_priority: BTreeMap<String, usize>,
    /// Initiatives per status.
    pub by_status: BTreeMap<String, usize>,
}

/// Serialized form of a roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapExport {
    /// Export time (RFC 3339, UTC).
    pub last_updated: String,
    /// All initiatives.
    pub initiatives: Vec<Initiative>,
    /// All milestones.
    pub milestones: Vec<Milestone>,
    /// Aggregated counts.
    pub summary: RoadmapSummary,
}

/// A progress metric shown in the roadmap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadmapMetric {
    /// What is measured.
    pub metric: &'static str,
    /// Goal value.
    pub target: String,
    /// Current value.
    pub current: String,
}

impl RoadmapExport {
    /// Progress metrics derived from the initiatives and milestones.
    #[must_use]
    pub fn metrics(&self) -> Vec<RoadmapMetric> {
        let completed = |i: &&Initiative| i.status == Status::Completed;
        let urgent: Vec<&Initiative> = self
            .initiatives
            .iter()
            .filter(|i| i.priority <= Priority::High)
            .collect();

        vec![
            RoadmapMetric {
                metric: "Initiatives completed",
                target: self.initiatives.len().to_string(),
                current: self.initiatives.iter().filter(completed).count().to_string(),
            },
            RoadmapMetric {
                metric: "Critical/High initiatives completed",
                target: urgent.len().to_string(),
                current: urgent.iter().copied().filter(completed).count().to_string(),
            },
            RoadmapMetric {
                metric: "Milestones completed",
                target: self.milestones.len().to_string(),
                current: self.milestones.iter().filter(|m| m.completed).count().to_string(),
            },
            RoadmapMetric {
                metric: "Initiatives deferred",
                target: "0".to_string(),
                current: self
                    .initiatives
                    .iter()
                    .filter(|i| i.status == Status::Deferred)
                    .count()
                    .to_string(),
            },
        ]
    }
}

/// Security improvement roadmap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roadmap {
    initiatives: Vec<Initiative>,
    milestones: Vec<Milestone>,
}

impl Roadmap {
    /// Create an empty roadmap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a roadmap from stored parts.
    #[must_use]
    pub fn from_parts(initiatives: Vec<Initiative>, milestones: Vec<Milestone>) -> Self {
        Self {
            initiatives,
            milestones,
        }
    }

    /// The standard SDL improvement roadmap.
    #[must_use]
    pub fn default_roadmap() -> Self {
        let mut roadmap = Self::new();
        let seed = [
            NewInitiative::new(
                "Automated Security Scanning",
                "Implement automated scanning for secrets, vulnerable dependencies, and config validation",
            )
            .quarter("Q1"),
            NewInitiative::new(
                "Threat Modeling Integration",
                "Integrate threat modeling into design phase for all new features",
            )
            .quarter("Q1"),
            NewInitiative::new(
                "Security Training Program",
                "Establish mandatory security awareness and secure coding training",
            )
            .priority(Priority::Medium)
            .quarter("Q2"),
            NewInitiative::new(
                "Incident Response Readiness",
                "Document and test incident response procedures",
            )
            .quarter("Q2"),
            NewInitiative::new(
                "Continuous Compliance Monitoring",
                "Automate compliance checks and reporting",
            )
            .priority(Priority::Medium)
            .quarter("Q3"),
        ];
        for initiative in seed {
            roadmap.push_initiative(initiative);
        }
        roadmap
    }

    /// All initiatives in creation order.
    #[must_use]
    pub fn initiatives(&self) -> &[Initiative] {
        &self.initiatives
    }

    /// All milestones in creation order.
    #[must_use]
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Look up an initiative.
    #[must_use]
    pub fn initiative(&self, id: &str) -> Option<&Initiative> {
        self.initiatives.iter().find(|i| i.id == id)
    }

    /// Milestones belonging to one initiative.
    pub fn milestones_for<'a>(
        &'a self,
        initiative_id: &'a str,
    ) -> impl Iterator<Item = &'a Milestone> {
        self.milestones
            .iter()
            .filter(move |m| m.initiative_id == initiative_id)
    }

    /// Add an initiative and return its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if a dependency names an unknown initiative.
    pub fn add_initiative(&mut self, initiative: NewInitiative) -> Result<String> {
        if let Some(missing) = initiative
            .dependencies
            .iter()
            .find(|dep| self.initiative(dep).is_none())
        {
            return Err(Error::UnknownInitiative(missing.clone()));
        }
        Ok(self.push_initiative(initiative))
    }

    fn push_initiative(&mut self, initiative: NewInitiative) -> String {
        let id = format!("I-{:03}", self.initiatives.len() + 1);
        debug!(id = %id, name = %initiative.name, "Adding initiative");
        self.initiatives.push(Initiative {
            id: id.clone(),
            name: initiative.name,
            description: initiative.description,
            priority: initiative.priority,
            status: Status::Planned,
            target_quarter: initiative.target_quarter,
            dependencies: initiative.dependencies,
            created: Utc::now(),
            completed_date: None,
        });
        id
    }

    /// Add a milestone to an initiative and return the milestone ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the initiative does not exist.
    pub fn add_milestone(
        &mut self,
        initiative_id: &str,
        milestone: impl Into<String>,
        due_date: Option<String>,
    ) -> Result<String> {
        if self.initiative(initiative_id).is_none() {
            return Err(Error::UnknownInitiative(initiative_id.to_string()));
        }

        let id = format!("M-{:03}", self.milestones.len() + 1);
        self.milestones.push(Milestone {
            id: id.clone(),
            initiative_id: initiative_id.to_string(),
            milestone: milestone.into(),
            due_date,
            completed: false,
        });
        Ok(id)
    }

    /// Update an initiative's status. Returns `false` if the ID is unknown.
    ///
    /// Moving to Completed stamps `completed_date`; moving away clears it.
    pub fn update_status(&mut self, initiative_id: &str, status: Status) -> bool {
        let Some(initiative) = self.initiatives.iter_mut().find(|i| i.id == initiative_id) else {
            return false;
        };

        initiative.status = status;
        initiative.completed_date = if status == Status::Completed {
            Some(Utc::now())
        } else {
            None
        };
        info!(id = %initiative_id, status = %status, "Initiative status updated");
        true
    }

    /// Mark a milestone as done. Returns `false` if the ID is unknown.
    pub fn complete_milestone(&mut self, milestone_id: &str) -> bool {
        match self.milestones.iter_mut().find(|m| m.id == milestone_id) {
            Some(milestone) => {
                milestone.completed = true;
                true
            }
            None => false,
        }
    }

    /// Snapshot the roadmap with summary counts.
    #[must_use]
    pub fn export(&self) -> RoadmapExport {
        RoadmapExport {
            last_updated: report::timestamp(),
            initiatives: self.initiatives.clone(),
            milestones: self.milestones.clone(),
            summary: RoadmapSummary {
                total_initiatives: self.initiatives.len(),
                by_priority: report::count_by(&self.initiatives, |i| i.priority.to_string()),
                by_status: report::count_by(&self.initiatives, |i| i.status.to_string()),
            },
        }
    }

    /// Export the roadmap as JSON to `output`, returning the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export_to(&self, output: impl AsRef<Path>) -> Result<PathBuf> {
        report::write_json(output, &self.export())
    }
}
