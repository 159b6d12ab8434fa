//! `sdlguard` - CLI for security development lifecycle tooling
//!
//! This binary provides the command-line interface for scanning source trees,
//! analyzing SDL gaps, building threat models and tracking the security roadmap.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use sdlguard::cli::{
    Cli, Command, ConfigCommand, GapsCommand, LintCommand, OutputFormat, RoadmapCommand,
    StrideCommand, TemplateCommand, ValidateCommand,
};
use sdlguard::docs::{render_roadmap, render_threat_model, ComponentInfo, DocumentKind};
use sdlguard::{
    init_logging, report, Config, Error, NewInitiative, RequirementsValidator, Roadmap,
    RoadmapStore, SdlGapAnalyzer, SdlState, ThreatModelingFramework,
};

type CliResult = Result<ExitCode, Box<dyn std::error::Error>>;

/// Exit status for findings that need review and documents that fail lint.
const EXIT_REVIEW: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // `config validate` reports a broken file itself
    if let Command::Config(ConfigCommand::Validate { file }) = cli.command {
        return Ok(validate_config_file(file.or(cli.config)));
    }

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Validate(cmd) => handle_validate(&config, cmd),
        Command::Gaps(cmd) => handle_gaps(&config, cmd),
        Command::Stride(cmd) => handle_stride(&config, cmd),
        Command::Roadmap(cmd) => handle_roadmap(&config, cmd),
        Command::Template(cmd) => handle_template(cmd),
        Command::Lint(cmd) => handle_lint(&cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

/// Markdown counterpart of a configured JSON output name.
fn markdown_path(json_name: &str) -> PathBuf {
    Path::new(json_name).with_extension("md")
}

fn handle_validate(config: &Config, cmd: ValidateCommand) -> CliResult {
    let mut validator = RequirementsValidator::new(&cmd.path, &config.scanner)?;
    let results = validator.validate();

    let output = cmd
        .output
        .unwrap_or_else(|| PathBuf::from(&config.reports.validation_report));
    let path = report::write_json(validator.report_path(output), &results)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!("Validation complete: {} findings", results.total_findings);
        println!("  High:   {}", results.by_severity.high);
        println!("  Medium: {}", results.by_severity.medium);
        println!("  Low:    {}", results.by_severity.low);
        for finding in &results.findings {
            println!(
                "  [{}] {}:{} {} ({})",
                finding.severity,
                finding.file,
                finding.line,
                finding.finding_type,
                finding.requirement
            );
        }
        println!("Status: {}", if results.passed() { "PASS" } else { "REVIEW_REQUIRED" });
        println!("Report saved to: {}", path.display());
    }

    if cmd.fail_on_findings && !results.passed() {
        return Ok(ExitCode::from(EXIT_REVIEW));
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_gaps(config: &Config, cmd: GapsCommand) -> CliResult {
    let state = match &cmd.state {
        Some(path) => SdlState::load(path)?,
        None => SdlState::new(),
    };

    let mut analyzer = SdlGapAnalyzer::new();
    let results = analyzer.analyze(&state);
    let output = cmd
        .output
        .unwrap_or_else(|| PathBuf::from(&config.reports.gap_report));
    let path = report::write_json(output, &results)?;

    println!(
        "Gap analysis complete: {} gaps identified ({} of {} controls implemented)",
        results.identified_gaps, results.implemented_controls, results.total_requirements
    );
    for gap in &results.gaps {
        println!(
            "  [{}] {} {}: {}",
            gap.priority, gap.requirement_id, gap.phase_name, gap.gap
        );
    }
    println!("Report saved to: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn handle_stride(config: &Config, cmd: StrideCommand) -> CliResult {
    let mut framework = ThreatModelingFramework::new(&cmd.component);
    framework.identify_threats(None, cmd.data_flow.as_deref());
    for (threat_id, mitigation) in cmd.mitigations {
        framework.add_mitigation(threat_id, mitigation);
    }
    let model = framework.threat_model();

    let path = match cmd.format {
        OutputFormat::Json => {
            let output = cmd
                .output
                .unwrap_or_else(|| PathBuf::from(&config.reports.threat_model));
            report::write_json(output, &model)?
        }
        OutputFormat::Markdown => {
            let output = cmd
                .output
                .unwrap_or_else(|| markdown_path(&config.reports.threat_model));
            let markdown = render_threat_model(&model, &ComponentInfo::new(&cmd.component));
            report::write_text(output, &markdown)?
        }
    };

    println!(
        "Threat model created with {} threats ({} high risk)",
        model.total_threats,
        model.count_at(sdlguard::stride::RiskLevel::High)
    );
    println!("Saved to: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

/// Load the stored roadmap, seeding the default initiatives on first use.
fn load_roadmap(store: &mut RoadmapStore) -> sdlguard::Result<Roadmap> {
    if store.is_empty()? {
        info!("No roadmap stored yet, seeding default initiatives");
        let roadmap = Roadmap::default_roadmap();
        store.save(&roadmap)?;
        return Ok(roadmap);
    }
    store.load()
}

fn handle_roadmap(config: &Config, cmd: RoadmapCommand) -> CliResult {
    let mut store = RoadmapStore::open(config.database_path())?;

    match cmd {
        RoadmapCommand::Init { force } => {
            if !force && !store.is_empty()? {
                println!(
                    "Roadmap already initialized at {}. Use --force to replace it.",
                    store.path().display()
                );
                return Ok(ExitCode::SUCCESS);
            }
            let roadmap = Roadmap::default_roadmap();
            store.save(&roadmap)?;
            println!(
                "Initialized roadmap with {} initiatives at {}",
                roadmap.initiatives().len(),
                store.path().display()
            );
        }
        RoadmapCommand::Add {
            name,
            description,
            priority,
            quarter,
            depends_on,
        } => {
            let mut roadmap = load_roadmap(&mut store)?;
            let mut initiative = NewInitiative::new(name, description).priority(priority.into());
            if let Some(quarter) = quarter {
                initiative = initiative.quarter(quarter);
            }
            for dependency in depends_on {
                initiative = initiative.depends_on(dependency);
            }
            let id = roadmap.add_initiative(initiative)?;
            store.save(&roadmap)?;
            println!("Added initiative {id}");
        }
        RoadmapCommand::Milestone {
            initiative,
            milestone,
            due,
        } => {
            let mut roadmap = load_roadmap(&mut store)?;
            let id = roadmap.add_milestone(&initiative, milestone, due)?;
            store.save(&roadmap)?;
            println!("Added milestone {id} to {initiative}");
        }
        RoadmapCommand::CompleteMilestone { milestone } => {
            let mut roadmap = load_roadmap(&mut store)?;
            if !roadmap.complete_milestone(&milestone) {
                return Err(Error::UnknownMilestone(milestone).into());
            }
            store.save(&roadmap)?;
            println!("Milestone {milestone} completed");
        }
        RoadmapCommand::Status { initiative, status } => {
            let mut roadmap = load_roadmap(&mut store)?;
            let status = status.into();
            if !roadmap.update_status(&initiative, status) {
                return Err(Error::UnknownInitiative(initiative).into());
            }
            store.save(&roadmap)?;
            println!("{initiative} is now {status}");
        }
        RoadmapCommand::List => {
            let roadmap = load_roadmap(&mut store)?;
            for initiative in roadmap.initiatives() {
                println!(
                    "{} [{}] {} - {} ({})",
                    initiative.id,
                    initiative.priority,
                    initiative.name,
                    initiative.status,
                    initiative.target_quarter.as_deref().unwrap_or("unscheduled")
                );
                for milestone in roadmap.milestones_for(&initiative.id) {
                    println!(
                        "    {} [{}] {}{}",
                        milestone.id,
                        if milestone.completed { "x" } else { " " },
                        milestone.milestone,
                        milestone
                            .due_date
                            .as_deref()
                            .map(|d| format!(" (due {d})"))
                            .unwrap_or_default()
                    );
                }
            }
        }
        RoadmapCommand::Export { output, format } => {
            let roadmap = load_roadmap(&mut store)?;
            let path = match format {
                OutputFormat::Json => {
                    let output = output
                        .unwrap_or_else(|| PathBuf::from(&config.reports.roadmap_export));
                    roadmap.export_to(output)?
                }
                OutputFormat::Markdown => {
                    let output =
                        output.unwrap_or_else(|| markdown_path(&config.reports.roadmap_export));
                    report::write_text(output, &render_roadmap(&roadmap.export()))?
                }
            };
            println!("Roadmap exported to: {}", path.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn handle_template(cmd: TemplateCommand) -> CliResult {
    let kind = DocumentKind::from(cmd.document);
    match cmd.output {
        Some(output) => {
            let path = report::write_text(output, kind.template())?;
            println!("Wrote {kind} template to {}", path.display());
        }
        None => print!("{}", kind.template()),
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_lint(cmd: &LintCommand) -> CliResult {
    let kind = DocumentKind::from(cmd.document);
    let markdown = std::fs::read_to_string(&cmd.file).map_err(|source| Error::FileRead {
        path: cmd.file.clone(),
        source,
    })?;

    let results = kind.lint(&markdown);
    if results.is_clean() {
        println!("{}: {kind} document OK", cmd.file.display());
        return Ok(ExitCode::SUCCESS);
    }

    for issue in &results.issues {
        println!("{}: {issue}", cmd.file.display());
    }
    println!("{} issue(s) found", results.issues.len());
    Ok(ExitCode::from(EXIT_REVIEW))
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Scanner]");
                println!("  Secrets scan:       {}", config.scanner.secrets_enabled);
                println!(
                    "  Config scan:        {}",
                    config.scanner.insecure_config_enabled
                );
                println!("  Extensions:         {}", config.scanner.extensions.join(" "));
                println!(
                    "  Excluded dirs:      {}",
                    config.scanner.excluded_dirs.join(" ")
                );
                println!("  Max file bytes:     {}", config.scanner.max_file_bytes);
                println!(
                    "  Extra patterns:     {}",
                    config.scanner.extra_secret_patterns.len()
                        + config.scanner.extra_config_patterns.len()
                );
                println!();
                println!("[Roadmap]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Reports]");
                println!("  Validation:         {}", config.reports.validation_report);
                println!("  Gap analysis:       {}", config.reports.gap_report);
                println!("  Threat model:       {}", config.reports.threat_model);
                println!("  Roadmap export:     {}", config.reports.roadmap_export);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => return Ok(validate_config_file(file)),
    }
    Ok(ExitCode::SUCCESS)
}

fn validate_config_file(file: Option<PathBuf>) -> ExitCode {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => {
            println!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Configuration error: {e}");
            ExitCode::FAILURE
        }
    }
}
