//! Scan findings and their aggregation.

use serde::{Deserialize, Serialize};

/// How urgently a finding needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed before release.
    High,
    /// Should be reviewed.
    Medium,
    /// Informational.
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// A single requirement violation found on one line of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// What was found, e.g. "Hardcoded password".
    #[serde(rename = "type")]
    pub finding_type: String,

    /// Severity inherited from the rule.
    pub severity: Severity,

    /// Path relative to the scan root, `/`-separated.
    pub file: String,

    /// 1-based line number.
    pub line: usize,

    /// The requirement this finding violates.
    pub requirement: String,

    /// Stable identifier for tracking a finding across runs.
    pub fingerprint: String,
}

impl Finding {
    /// Create a finding, computing its fingerprint.
    #[must_use]
    pub fn new(
        finding_type: impl Into<String>,
        severity: Severity,
        file: impl Into<String>,
        line: usize,
        requirement: impl Into<String>,
    ) -> Self {
        let finding_type = finding_type.into();
        let file = file.into();
        let requirement = requirement.into();
        let fingerprint = Self::compute_fingerprint(&requirement, &file, line, &finding_type);
        Self {
            finding_type,
            severity,
            file,
            line,
            requirement,
            fingerprint,
        }
    }

    /// BLAKE3 over the identifying fields, truncated to 16 hex characters.
    #[must_use]
    pub fn compute_fingerprint(
        requirement: &str,
        file: &str,
        line: usize,
        finding_type: &str,
    ) -> String {
        let input = format!("{requirement}|{file}|{line}|{finding_type}");
        let hex = blake3::hash(input.as_bytes()).to_hex();
        hex.as_str()[..16].to_string()
    }
}

/// Finding counts per severity. All three keys are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    /// Number of high severity findings.
    pub high: usize,
    /// Number of medium severity findings.
    pub medium: usize,
    /// Number of low severity findings.
    pub low: usize,
}

impl SeverityCounts {
    /// Tally the given findings.
    #[must_use]
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts
    }

    /// Total across all severities.
    #[must_use]
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}
