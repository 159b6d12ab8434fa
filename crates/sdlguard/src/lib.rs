//! `sdlguard` - Security development lifecycle tooling
//!
//! This library provides a requirements validator that scans source trees for
//! hardcoded secrets and insecure configuration, an SDL gap analyzer, a STRIDE
//! threat-modeling framework, a persistent security roadmap, and the Markdown
//! templates and lint that keep the matching documents in shape.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod docs;
pub mod error;
pub mod logging;
pub mod report;
pub mod roadmap;
pub mod scanner;
pub mod sdl;
pub mod storage;
pub mod stride;

pub use config::Config;
pub use docs::{DocumentKind, LintReport};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use roadmap::{Initiative, Milestone, NewInitiative, Priority, Roadmap, Status};
pub use scanner::{Finding, RequirementsValidator, Severity, ValidationReport, ValidationStatus};
pub use sdl::{GapReport, SdlGapAnalyzer, SdlState};
pub use storage::RoadmapStore;
pub use stride::{StrideCategory, ThreatModel, ThreatModelingFramework};
