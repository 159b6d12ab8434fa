//! STRIDE threat modeling.
//!
//! Every component is checked against a fixed checklist per STRIDE
//! category. Each checklist entry becomes an open [`Threat`] with an
//! initial risk level; analysts then attach mitigations by threat ID.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::report;

/// Methodology name recorded in generated models.
pub const METHODOLOGY: &str = "STRIDE";

/// Status given to newly identified threats.
pub const OPEN_STATUS: &str = "Open";

/// Value recorded when no data flow is given.
pub const NO_DATA_FLOW: &str = "N/A";

/// Threat descriptions that start out as high risk.
const HIGH_RISK_MARKERS: &[&str] = &[
    "Credential theft",
    "Privilege escalation",
    "Data modification at rest",
];

/// The six STRIDE threat categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrideCategory {
    /// Pretending to be someone or something else.
    Spoofing,
    /// Modifying data or code.
    Tampering,
    /// Denying having performed an action.
    Repudiation,
    /// Exposing information to unauthorized parties.
    #[serde(rename = "Information Disclosure")]
    InformationDisclosure,
    /// Degrading or denying service.
    #[serde(rename = "Denial of Service")]
    DenialOfService,
    /// Gaining capabilities without authorization.
    #[serde(rename = "Elevation of Privilege")]
    ElevationOfPrivilege,
}

impl StrideCategory {
    /// All categories, in mnemonic order.
    pub const ALL: [Self; 6] = [
        Self::Spoofing,
        Self::Tampering,
        Self::Repudiation,
        Self::InformationDisclosure,
        Self::DenialOfService,
        Self::ElevationOfPrivilege,
    ];

    /// Human-readable category name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Spoofing => "Spoofing",
            Self::Tampering => "Tampering",
            Self::Repudiation => "Repudiation",
            Self::InformationDisclosure => "Information Disclosure",
            Self::DenialOfService => "Denial of Service",
            Self::ElevationOfPrivilege => "Elevation of Privilege",
        }
    }

    /// Threats every component is checked for in this category.
    #[must_use]
    pub fn checklist(&self) -> &'static [&'static str] {
        match self {
            Self::Spoofing => &[
                "Authentication mechanism bypass",
                "Credential theft or replay",
                "Session hijacking",
                "Identity impersonation",
            ],
            Self::Tampering => &[
                "Data modification in transit",
                "Data modification at rest",
                "Configuration tampering",
                "Code or binary modification",
            ],
            Self::Repudiation => &[
                "Lack of audit logging",
                "Log tampering or deletion",
                "Non-repudiation controls missing",
            ],
            Self::InformationDisclosure => &[
                "Sensitive data in logs",
                "Inadequate access controls",
                "Information leakage in errors",
                "Insecure data transmission",
            ],
            Self::DenialOfService => &[
                "Resource exhaustion",
                "Lack of rate limiting",
                "Single points of failure",
                "No graceful degradation",
            ],
            Self::ElevationOfPrivilege => &[
                "Privilege escalation paths",
                "Insufficient authorization checks",
                "Default credentials",
                "Overly permissive defaults",
            ],
        }
    }
}

impl std::fmt::Display for StrideCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Initial risk rating of a threat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Needs mitigation before release.
    High,
    /// Needs a documented decision.
    Medium,
    /// Accept or monitor.
    Low,
}

impl RiskLevel {
    /// Initial risk for a threat description.
    #[must_use]
    pub fn assess(description: &str) -> Self {
        if HIGH_RISK_MARKERS.iter().any(|m| description.contains(m)) {
            Self::High
        } else {
            Self::Medium
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A threat identified against a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threat {
    /// Sequential identifier, `T-0001` onward.
    pub id: String,
    /// STRIDE category.
    pub category: StrideCategory,
    /// Checklist entry.
    pub description: String,
    /// Component under analysis.
    pub component: String,
    /// Data flow under analysis, or `N/A`.
    pub data_flow: String,
    /// Initial risk.
    pub risk_level: RiskLevel,
    /// Triage status.
    pub status: String,
}

/// Threat counts by category and by risk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatSummary {
    /// Threats per category name.
    pub by_category: BTreeMap<String, usize>,
    /// Threats per risk level.
    pub by_risk: BTreeMap<String, usize>,
}

/// A complete threat model document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatModel {
    /// Component name.
    pub component: String,
    /// Generation time (RFC 3339, UTC).
    pub timestamp: String,
    /// Always `STRIDE`.
    pub methodology: String,
    /// Number of threats.
    pub total_threats: usize,
    /// All threats in identification order.
    pub threats: Vec<Threat>,
    /// Mitigations keyed by threat ID.
    pub mitigations: BTreeMap<String, Vec<String>>,
    /// Aggregated counts.
    pub summary: ThreatSummary,
}

impl ThreatModel {
    /// Threats belonging to one category.
    pub fn threats_in(&self, category: StrideCategory) -> impl Iterator<Item = &Threat> {
        self.threats.iter().filter(move |t| t.category == category)
    }

    /// Number of threats at the given risk level.
    #[must_use]
    pub fn count_at(&self, risk: RiskLevel) -> usize {
        self.threats.iter().filter(|t| t.risk_level == risk).count()
    }
}

/// STRIDE-based threat modeling for a single component.
#[derive(Debug, Clone)]
pub struct ThreatModelingFramework {
    component_name: String,
    threats: Vec<Threat>,
    mitigations: BTreeMap<String, Vec<String>>,
}

impl ThreatModelingFramework {
    /// Create a framework for the named component.
    #[must_use]
    pub fn new(component_name: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
            threats: Vec::new(),
            mitigations: BTreeMap::new(),
        }
    }

    /// The component this framework models.
    #[must_use]
    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    /// Threats identified so far.
    #[must_use]
    pub fn threats(&self) -> &[Threat] {
        &self.threats
    }

    /// Identify threats by walking every STRIDE checklist.
    ///
    /// Replaces any previously identified threats. `component` overrides the
    /// framework's component name for the threat records.
    pub fn identify_threats(
        &mut self,
        component: Option<&str>,
        data_flow: Option<&str>,
    ) -> &[Threat] {
        let target = component.unwrap_or(&self.component_name).to_string();
        let data_flow = data_flow.unwrap_or(NO_DATA_FLOW).to_string();

        self.threats.clear();
        for category in StrideCategory::ALL {
            for description in category.checklist() {
                let id = format!("T-{:04}", self.threats.len() + 1);
                self.threats.push(Threat {
                    id,
                    category,
                    description: (*description).to_string(),
                    component: target.clone(),
                    data_flow: data_flow.clone(),
                    risk_level: RiskLevel::assess(description),
                    status: OPEN_STATUS.to_string(),
                });
            }
        }

        debug!(component = %target, threats = self.threats.len(), "Threats identified");
        &self.threats
    }

    /// Record a mitigation for a threat. IDs are not checked against the
    /// identified threats so mitigations can be recorded up front.
    pub fn add_mitigation(&mut self, threat_id: impl Into<String>, mitigation: impl Into<String>) {
        self.mitigations
            .entry(threat_id.into())
            .or_default()
            .push(mitigation.into());
    }

    /// Build the threat model, identifying threats first if none exist.
    pub fn threat_model(&mut self) -> ThreatModel {
        if self.threats.is_empty() {
            self.identify_threats(None, None);
        }

        let summary = ThreatSummary {
            by_category: report::count_by(&self.threats, |t| t.category.name().to_string()),
            by_risk: report::count_by(&self.threats, |t| t.risk_level.name().to_string()),
        };

        ThreatModel {
            component: self.component_name.clone(),
            timestamp: report::timestamp(),
            methodology: METHODOLOGY.to_string(),
            total_threats: self.threats.len(),
            threats: self.threats.clone(),
            mitigations: self.mitigations.clone(),
            summary,
        }
    }

    /// Build the threat model and write it as JSON, returning the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be written.
    pub fn generate_threat_model(&mut self, output: impl AsRef<Path>) -> Result<PathBuf> {
        let model = self.threat_model();
        let path = report::write_json(output, &model)?;
        info!(
            component = %model.component,
            threats = model.total_threats,
            "Threat model written to {}",
            path.display()
        );
        Ok(path)
    }
}

/// File name used for a component's threat model.
#[must_use]
pub fn threat_model_file_name(component: &str) -> String {
    format!("threat_model_{}.json", component.to_lowercase().replace(' ', "_"))
}

/// Identify threats for `component` and write its model into `output_dir`.
///
/// # Errors
///
/// Returns an error if the model cannot be written.
pub fn create_threat_model(component: &str, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let mut framework = ThreatModelingFramework::new(component);
    framework.identify_threats(None, None);
    let output = output_dir.as_ref().join(threat_model_file_name(component));
    framework.generate_threat_model(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        let names: Vec<_> = StrideCategory::ALL.iter().map(StrideCategory::name).collect();
        assert_eq!(
            names,
            vec![
                "Spoofing",
                "Tampering",
                "Repudiation",
                "Information Disclosure",
                "Denial of Service",
                "Elevation of Privilege",
            ]
        );
    }

    #[test]
    fn test_category_serializes_display_name() {
        let json = serde_json::to_string(&StrideCategory::DenialOfService).unwrap();
        assert_eq!(json, "\"Denial of Service\"");
    }

    #[test]
    fn test_assess_risk() {
        assert_eq!(RiskLevel::assess("Credential theft or replay"), RiskLevel::High);
        assert_eq!(RiskLevel::assess("Privilege escalation paths"), RiskLevel::High);
        assert_eq!(RiskLevel::assess("Data modification at rest"), RiskLevel::High);
        assert_eq!(RiskLevel::assess("Data modification in transit"), RiskLevel::Medium);
        assert_eq!(RiskLevel::assess("Session hijacking"), RiskLevel::Medium);
    }

    #[test]
    fn test_identify_threats() {
        let mut framework = ThreatModelingFramework::new("Web Application");
        let threats = framework.identify_threats(None, None);

        assert_eq!(threats.len(), 23);
        assert_eq!(threats[0].id, "T-0001");
        assert_eq!(threats[22].id, "T-0023");
        assert_eq!(threats[0].category, StrideCategory::Spoofing);
        assert_eq!(threats[22].category, StrideCategory::ElevationOfPrivilege);
        assert!(threats.iter().all(|t| t.component == "Web Application"));
        assert!(threats.iter().all(|t| t.data_flow == "N/A"));
        assert!(threats.iter().all(|t| t.status == "Open"));
    }

    #[test]
    fn test_identify_threats_with_overrides() {
        let mut framework = ThreatModelingFramework::new("System");
        let threats = framework.identify_threats(Some("Auth Service"), Some("Login -> DB"));

        assert!(threats.iter().all(|t| t.component == "Auth Service"));
        assert!(threats.iter().all(|t| t.data_flow == "Login -> DB"));
    }

    #[test]
    fn test_identify_threats_replaces_previous() {
        let mut framework = ThreatModelingFramework::new("System");
        framework.identify_threats(None, None);
        let threats = framework.identify_threats(None, None);
        assert_eq!(threats.len(), 23);
        assert_eq!(threats[0].id, "T-0001");
    }

    #[test]
    fn test_threat_model_identifies_when_empty() {
        let mut framework = ThreatModelingFramework::new("API");
        let model = framework.threat_model();

        assert_eq!(model.total_threats, 23);
        assert_eq!(model.methodology, "STRIDE");
        assert_eq!(model.count_at(RiskLevel::High), 3);
        assert_eq!(model.summary.by_risk.get("High"), Some(&3));
        assert_eq!(model.summary.by_risk.get("Medium"), Some(&20));
        assert_eq!(model.summary.by_category.get("Repudiation"), Some(&3));
        assert_eq!(model.summary.by_category.get("Spoofing"), Some(&4));
        assert_eq!(model.threats_in(StrideCategory::Tampering).count(), 4);
    }

    #[test]
    fn test_add_mitigation() {
        let mut framework = ThreatModelingFramework::new("API");
        framework.add_mitigation("T-0001", "Enforce MFA");
        framework.add_mitigation("T-0001", "Lock out after failed attempts");
        framework.add_mitigation("T-0099", "Recorded ahead of identification");

        let model = framework.threat_model();
        assert_eq!(model.mitigations["T-0001"].len(), 2);
        assert!(model.mitigations.contains_key("T-0099"));
    }

    #[test]
    fn test_threat_model_file_name() {
        assert_eq!(
            threat_model_file_name("Payment Gateway"),
            "threat_model_payment_gateway.json"
        );
    }

    #[test]
    fn test_create_threat_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_threat_model("Web App", dir.path()).unwrap();

        assert_eq!(path, dir.path().join("threat_model_web_app.json"));
        let model: ThreatModel =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(model.component, "Web App");
        assert_eq!(model.total_threats, 23);
    }
}
