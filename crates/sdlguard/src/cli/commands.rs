//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Validate command arguments.
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Report file (relative paths resolve against the scanned directory)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Exit with status 2 when findings need review
    #[arg(long)]
    pub fail_on_findings: bool,
}

/// Gap analysis command arguments.
#[derive(Debug, Args)]
pub struct GapsCommand {
    /// JSON or TOML file listing implemented controls per phase
    #[arg(short, long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Report file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// STRIDE command arguments.
#[derive(Debug, Args)]
pub struct StrideCommand {
    /// Component to model
    #[arg(default_value = "System")]
    pub component: String,

    /// Data flow under analysis
    #[arg(short, long)]
    pub data_flow: Option<String>,

    /// Mitigation for a threat, as THREAT_ID=TEXT (repeatable)
    #[arg(short, long = "mitigation", value_name = "ID=TEXT", value_parser = parse_mitigation)]
    pub mitigations: Vec<(String, String)>,

    /// Output file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

fn parse_mitigation(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((id, text)) if !id.trim().is_empty() && !text.trim().is_empty() => {
            Ok((id.trim().to_string(), text.trim().to_string()))
        }
        _ => Err(format!("expected THREAT_ID=TEXT, got '{value}'")),
    }
}

/// Roadmap commands.
#[derive(Debug, Subcommand)]
pub enum RoadmapCommand {
    /// Seed the roadmap with the default initiatives
    Init {
        /// Replace an existing roadmap
        #[arg(short, long)]
        force: bool,
    },

    /// Add an initiative
    Add {
        /// Short name
        name: String,

        /// What the initiative delivers
        description: String,

        /// Priority
        #[arg(short, long, value_enum, default_value = "high")]
        priority: PriorityArg,

        /// Target quarter, e.g. Q1
        #[arg(short = 't', long)]
        quarter: Option<String>,

        /// Prerequisite initiative ID (repeatable)
        #[arg(short, long = "depends-on", value_name = "ID")]
        depends_on: Vec<String>,
    },

    /// Add a milestone to an initiative
    Milestone {
        /// Initiative ID
        initiative: String,

        /// What must be achieved
        milestone: String,

        /// Due date
        #[arg(short, long)]
        due: Option<String>,
    },

    /// Mark a milestone as completed
    CompleteMilestone {
        /// Milestone ID
        milestone: String,
    },

    /// Update an initiative's status
    Status {
        /// Initiative ID
        initiative: String,

        /// New status
        #[arg(value_enum)]
        status: StatusArg,
    },

    /// List initiatives and milestones
    List,

    /// Export the roadmap
    Export {
        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
}

/// Template command arguments.
#[derive(Debug, Args)]
pub struct TemplateCommand {
    /// Which template to write
    #[arg(value_enum)]
    pub document: DocumentArg,

    /// Output file (prints to stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Lint command arguments.
#[derive(Debug, Args)]
pub struct LintCommand {
    /// Which document shape to check against
    #[arg(value_enum)]
    pub document: DocumentArg,

    /// Markdown file to check
    pub file: PathBuf,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Priority argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    /// Critical
    Critical,
    /// High
    High,
    /// Medium
    Medium,
    /// Low
    Low,
}

impl From<PriorityArg> for crate::roadmap::Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Critical => Self::Critical,
            PriorityArg::High => Self::High,
            PriorityArg::Medium => Self::Medium,
            PriorityArg::Low => Self::Low,
        }
    }
}

/// Initiative status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Planned
    Planned,
    /// In progress
    InProgress,
    /// Completed
    Completed,
    /// Deferred
    Deferred,
}

impl From<StatusArg> for crate::roadmap::Status {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Planned => Self::Planned,
            StatusArg::InProgress => Self::InProgress,
            StatusArg::Completed => Self::Completed,
            StatusArg::Deferred => Self::Deferred,
        }
    }
}

/// Document argument for templates and lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentArg {
    /// STRIDE threat model
    ThreatModel,
    /// Security roadmap
    Roadmap,
}

impl From<DocumentArg> for crate::docs::DocumentKind {
    fn from(arg: DocumentArg) -> Self {
        match arg {
            DocumentArg::ThreatModel => Self::ThreatModel,
            DocumentArg::Roadmap => Self::Roadmap,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON document
    #[default]
    Json,
    /// Markdown document
    Markdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::DocumentKind;
    use crate::roadmap::{Priority, Status};

    #[test]
    fn test_priority_arg_conversion() {
        assert_eq!(Priority::from(PriorityArg::Critical), Priority::Critical);
        assert_eq!(Priority::from(PriorityArg::High), Priority::High);
        assert_eq!(Priority::from(PriorityArg::Medium), Priority::Medium);
        assert_eq!(Priority::from(PriorityArg::Low), Priority::Low);
    }

    #[test]
    fn test_status_arg_conversion() {
        assert_eq!(Status::from(StatusArg::Planned), Status::Planned);
        assert_eq!(Status::from(StatusArg::InProgress), Status::InProgress);
        assert_eq!(Status::from(StatusArg::Completed), Status::Completed);
        assert_eq!(Status::from(StatusArg::Deferred), Status::Deferred);
    }

    #[test]
    fn test_document_arg_conversion() {
        assert_eq!(
            DocumentKind::from(DocumentArg::ThreatModel),
            DocumentKind::ThreatModel
        );
        assert_eq!(DocumentKind::from(DocumentArg::Roadmap), DocumentKind::Roadmap);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
    }

    #[test]
    fn test_parse_mitigation() {
        assert_eq!(
            parse_mitigation("T-0001=Enforce MFA").unwrap(),
            ("T-0001".to_string(), "Enforce MFA".to_string())
        );
        assert_eq!(
            parse_mitigation("T-0002 = a=b").unwrap(),
            ("T-0002".to_string(), "a=b".to_string())
        );
        assert!(parse_mitigation("T-0001").is_err());
        assert!(parse_mitigation("=text").is_err());
        assert!(parse_mitigation("T-0001=").is_err());
    }

    #[test]
    fn test_roadmap_command_debug() {
        let cmd = RoadmapCommand::Init { force: true };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Init"));
        assert!(debug_str.contains("force"));
    }
}
