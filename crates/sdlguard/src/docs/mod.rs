//! Security documents: the STRIDE threat-model template, the roadmap
//! document, rendering of both from live data, and a shape lint.
//!
//! # Example
//!
//! ```
//! use sdlguard::docs::{lint_threat_model, THREAT_MODEL_TEMPLATE};
//!
//! assert!(lint_threat_model(THREAT_MODEL_TEMPLATE).is_clean());
//! ```

mod lint;
mod render;

use serde::Serialize;

pub use lint::{
    lint_roadmap, lint_threat_model, LintIssue, LintReport, METRICS_COLUMNS, STRIDE_COLUMNS,
    STRIDE_SECTION,
};
pub use render::{render_roadmap, render_threat_model, ComponentInfo};

/// Blank STRIDE threat-model template.
pub const THREAT_MODEL_TEMPLATE: &str = include_str!("templates/threat_model.md");

/// Security roadmap document with phased initiatives and a metrics table.
pub const ROADMAP_TEMPLATE: &str = include_str!("templates/roadmap.md");

/// The document shapes sdlguard knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    /// STRIDE threat model.
    ThreatModel,
    /// Security roadmap.
    Roadmap,
}

impl DocumentKind {
    /// The blank template for this document.
    #[must_use]
    pub fn template(&self) -> &'static str {
        match self {
            Self::ThreatModel => THREAT_MODEL_TEMPLATE,
            Self::Roadmap => ROADMAP_TEMPLATE,
        }
    }

    /// Lint `markdown` as this kind of document.
    #[must_use]
    pub fn lint(&self, markdown: &str) -> LintReport {
        match self {
            Self::ThreatModel => lint_threat_model(markdown),
            Self::Roadmap => lint_roadmap(markdown),
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ThreatModel => write!(f, "threat model"),
            Self::Roadmap => write!(f, "roadmap"),
        }
    }
}
