//! SDL process gap analysis.
//!
//! Compares the controls a team reports as implemented against the six
//! Security Development Lifecycle phases and lists every missing control.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::report;

/// A phase of the Security Development Lifecycle and its required controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdlPhase {
    /// Key used in state files, e.g. `design`.
    pub key: &'static str,
    /// Requirement identifier, e.g. `SDL-003`.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Controls that must all be in place.
    pub controls: &'static [&'static str],
}

/// The SDL requirement catalogue, in lifecycle order.
pub const SDL_PHASES: &[SdlPhase] = &[
    SdlPhase {
        key: "training",
        id: "SDL-001",
        name: "Security Training",
        controls: &[
            "Developer security awareness training completed",
            "Secure coding practices documented",
            "Annual training refresh",
        ],
    },
    SdlPhase {
        key: "requirements",
        id: "SDL-002",
        name: "Security Requirements",
        controls: &[
            "Security requirements defined in design phase",
            "Privacy requirements documented",
            "Compliance requirements mapped",
        ],
    },
    SdlPhase {
        key: "design",
        id: "SDL-003",
        name: "Secure Design",
        controls: &[
            "Threat model completed",
            "Security architecture reviewed",
            "Attack surface minimized",
        ],
    },
    SdlPhase {
        key: "implementation",
        id: "SDL-004",
        name: "Secure Implementation",
        controls: &[
            "Static analysis integrated",
            "No known vulnerable dependencies",
            "Secrets managed securely",
        ],
    },
    SdlPhase {
        key: "verification",
        id: "SDL-005",
        name: "Security Verification",
        controls: &[
            "Dynamic testing performed",
            "Penetration testing for critical components",
            "Security sign-off documented",
        ],
    },
    SdlPhase {
        key: "release",
        id: "SDL-006",
        name: "Secure Release",
        controls: &[
            "Incident response plan in place",
            "Security update process defined",
            "Vulnerability disclosure process",
        ],
    },
];

/// Remediation priority of a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPriority {
    /// Design, implementation and verification gaps.
    High,
    /// Requirements, release and training gaps.
    Medium,
    /// Anything else.
    Low,
}

impl GapPriority {
    /// Priority assigned to gaps in the given phase.
    #[must_use]
    pub fn for_phase(phase: &str) -> Self {
        match phase {
            "design" | "implementation" | "verification" => Self::High,
            "requirements" | "release" | "training" => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl std::fmt::Display for GapPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// A required control that is not implemented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    /// Phase key.
    pub phase: String,
    /// Phase requirement identifier.
    pub requirement_id: String,
    /// Phase display name.
    pub phase_name: String,
    /// The missing control.
    pub gap: String,
    /// Remediation priority.
    pub priority: GapPriority,
}

/// Implemented controls per phase key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SdlState(pub BTreeMap<String, Vec<String>>);

impl SdlState {
    /// Create an empty state (nothing implemented).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a control as implemented.
    #[must_use]
    pub fn with_control(mut self, phase: &str, control: &str) -> Self {
        self.0
            .entry(phase.to_string())
            .or_default()
            .push(control.to_string());
        self
    }

    /// Load a state file. `.json` files are parsed as JSON, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed: std::result::Result<Self, String> = if is_json {
            serde_json::from_str(&contents).map_err(|e| e.to_string())
        } else {
            toml::from_str(&contents).map_err(|e| e.to_string())
        };

        let state: Self = parsed.map_err(|message| Error::StateParse {
            path: path.to_path_buf(),
            message,
        })?;

        for key in state.0.keys() {
            if !SDL_PHASES.iter().any(|p| p.key == key.as_str()) {
                warn!(phase = %key, "Ignoring unknown SDL phase in state file");
            }
        }

        Ok(state)
    }

    fn implemented(&self, phase: &str) -> HashSet<&str> {
        self.0
            .get(phase)
            .map(|controls| controls.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Result of a gap analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapReport {
    /// When the analysis ran (RFC 3339, UTC).
    pub timestamp: String,
    /// Number of controls in the catalogue.
    pub total_requirements: usize,
    /// Number of catalogue controls found implemented.
    pub implemented_controls: usize,
    /// Number of gaps.
    pub identified_gaps: usize,
    /// The gaps, in lifecycle then catalogue order.
    pub gaps: Vec<Gap>,
    /// Phase keys that were analyzed.
    pub phases_analyzed: Vec<String>,
}

/// Identifies gaps in Security Development Lifecycle implementation.
#[derive(Debug, Default)]
pub struct SdlGapAnalyzer {
    gaps: Vec<Gap>,
}

impl SdlGapAnalyzer {
    /// Create a new analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gaps found by the last analysis.
    #[must_use]
    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    /// Analyze `state` against the catalogue. Controls match by exact text.
    pub fn analyze(&mut self, state: &SdlState) -> GapReport {
        self.gaps.clear();

        for phase in SDL_PHASES {
            let implemented = state.implemented(phase.key);
            for control in phase.controls {
                if !implemented.contains(control) {
                    self.gaps.push(Gap {
                        phase: phase.key.to_string(),
                        requirement_id: phase.id.to_string(),
                        phase_name: phase.name.to_string(),
                        gap: (*control).to_string(),
                        priority: GapPriority::for_phase(phase.key),
                    });
                }
            }
        }

        let total_requirements = total_requirements();
        info!(gaps = self.gaps.len(), "SDL gap analysis finished");

        GapReport {
            timestamp: report::timestamp(),
            total_requirements,
            implemented_controls: total_requirements - self.gaps.len(),
            identified_gaps: self.gaps.len(),
            gaps: self.gaps.clone(),
            phases_analyzed: SDL_PHASES.iter().map(|p| p.key.to_string()).collect(),
        }
    }

    /// Analyze and write the JSON report, returning its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be written.
    pub fn generate_report(
        &mut self,
        state: &SdlState,
        output: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let results = self.analyze(state);
        report::write_json(output, &results)
    }
}

/// Number of controls across all phases.
#[must_use]
pub fn total_requirements() -> usize {
    SDL_PHASES.iter().map(|p| p.controls.len()).sum()
}
