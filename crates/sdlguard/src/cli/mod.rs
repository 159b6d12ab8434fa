//! Command-line interface for sdlguard.
//!
//! This module provides the CLI structure for the `sdlguard` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DocumentArg, GapsCommand, LintCommand, OutputFormat, PriorityArg,
    RoadmapCommand, StatusArg, StrideCommand, TemplateCommand, ValidateCommand,
};

/// sdlguard - Security development lifecycle tooling
///
/// Scans source trees for hardcoded secrets and insecure configuration,
/// analyzes SDL control gaps, builds STRIDE threat models and tracks a
/// security improvement roadmap.
#[derive(Debug, Parser)]
#[command(name = "sdlguard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan a directory for hardcoded secrets and insecure configuration
    Validate(ValidateCommand),

    /// Analyze SDL control coverage
    Gaps(GapsCommand),

    /// Build a STRIDE threat model for a component
    Stride(StrideCommand),

    /// Track the security roadmap
    #[command(subcommand)]
    Roadmap(RoadmapCommand),

    /// Write a blank document template
    Template(TemplateCommand),

    /// Check a document's structure
    Lint(LintCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Roadmap(RoadmapCommand::List),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "sdlguard");
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_validate_defaults() {
        let cli = Cli::try_parse_from(["sdlguard", "validate"]).unwrap();
        let Command::Validate(cmd) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(cmd.path, PathBuf::from("."));
        assert!(cmd.output.is_none());
        assert!(!cmd.fail_on_findings);
    }

    #[test]
    fn test_parse_validate_with_options() {
        let cli = Cli::try_parse_from([
            "sdlguard",
            "validate",
            "src",
            "-o",
            "out.json",
            "--json",
            "--fail-on-findings",
        ])
        .unwrap();
        let Command::Validate(cmd) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(cmd.path, PathBuf::from("src"));
        assert_eq!(cmd.output, Some(PathBuf::from("out.json")));
        assert!(cmd.json);
        assert!(cmd.fail_on_findings);
    }

    #[test]
    fn test_parse_gaps() {
        let cli = Cli::try_parse_from(["sdlguard", "gaps", "--state", "sdl.toml"]).unwrap();
        let Command::Gaps(cmd) = cli.command else {
            panic!("expected gaps");
        };
        assert_eq!(cmd.state, Some(PathBuf::from("sdl.toml")));
    }

    #[test]
    fn test_parse_stride_with_mitigations() {
        let cli = Cli::try_parse_from([
            "sdlguard",
            "stride",
            "Web App",
            "--data-flow",
            "Browser -> API",
            "-m",
            "T-0001=Enforce MFA",
            "--mitigation",
            "T-0005=TLS everywhere",
            "--format",
            "markdown",
        ])
        .unwrap();
        let Command::Stride(cmd) = cli.command else {
            panic!("expected stride");
        };
        assert_eq!(cmd.component, "Web App");
        assert_eq!(cmd.data_flow.as_deref(), Some("Browser -> API"));
        assert_eq!(cmd.mitigations.len(), 2);
        assert_eq!(cmd.mitigations[1].0, "T-0005");
        assert_eq!(cmd.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_parse_stride_rejects_bad_mitigation() {
        let result = Cli::try_parse_from(["sdlguard", "stride", "-m", "no-equals"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_roadmap_add() {
        let cli = Cli::try_parse_from([
            "sdlguard",
            "roadmap",
            "add",
            "SAST gate",
            "Block merges on findings",
            "-p",
            "critical",
            "-t",
            "Q4",
            "--depends-on",
            "I-001",
        ])
        .unwrap();
        let Command::Roadmap(RoadmapCommand::Add {
            priority,
            quarter,
            depends_on,
            ..
        }) = cli.command
        else {
            panic!("expected roadmap add");
        };
        assert_eq!(priority, PriorityArg::Critical);
        assert_eq!(quarter.as_deref(), Some("Q4"));
        assert_eq!(depends_on, vec!["I-001"]);
    }

    #[test]
    fn test_parse_roadmap_status() {
        let cli = Cli::try_parse_from(["sdlguard", "roadmap", "status", "I-002", "in-progress"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Roadmap(RoadmapCommand::Status {
                status: StatusArg::InProgress,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_roadmap_complete_milestone() {
        let cli =
            Cli::try_parse_from(["sdlguard", "roadmap", "complete-milestone", "M-001"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Roadmap(RoadmapCommand::CompleteMilestone { .. })
        ));
    }

    #[test]
    fn test_parse_template_and_lint() {
        let cli = Cli::try_parse_from(["sdlguard", "template", "threat-model"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Template(TemplateCommand {
                document: DocumentArg::ThreatModel,
                output: None
            })
        ));

        let cli = Cli::try_parse_from(["sdlguard", "lint", "roadmap", "ROADMAP.md"]).unwrap();
        let Command::Lint(cmd) = cli.command else {
            panic!("expected lint");
        };
        assert_eq!(cmd.document, DocumentArg::Roadmap);
        assert_eq!(cmd.file, PathBuf::from("ROADMAP.md"));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["sdlguard", "-c", "/custom/config.toml", "config", "path"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let cli = Cli::try_parse_from(["sdlguard", "-vv", "roadmap", "list"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
