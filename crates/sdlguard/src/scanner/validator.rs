//! Requirements validation over a source tree.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};
use walkdir::{DirEntry, WalkDir};

use super::finding::{Finding, SeverityCounts};
use super::patterns::{insecure_config_rule, secrets_rule, ScanRule};
use crate::config::ScannerConfig;
use crate::error::{Error, Result};
use crate::report;

/// Overall outcome of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    /// No findings.
    Pass,
    /// At least one finding needs review.
    ReviewRequired,
}

/// The result of validating a tree against the security requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// When the validation ran (RFC 3339, UTC).
    pub timestamp: String,
    /// The scanned directory, as given.
    pub target: String,
    /// Number of findings.
    pub total_findings: usize,
    /// Findings per severity.
    pub by_severity: SeverityCounts,
    /// Always `true`: every enabled requirement was checked.
    pub requirements_validated: bool,
    /// All findings, secrets first, in file order.
    pub findings: Vec<Finding>,
    /// Pass or review required.
    pub status: ValidationStatus,
}

impl ValidationReport {
    /// Whether the report has no findings.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == ValidationStatus::Pass
    }
}

/// Validates a project tree against the secret and configuration requirements.
#[derive(Debug)]
pub struct RequirementsValidator {
    target: PathBuf,
    secrets: Option<ScanRule>,
    insecure_config: Option<ScanRule>,
    extensions: Vec<String>,
    excluded_dirs: Vec<String>,
    max_file_bytes: u64,
    findings: Vec<Finding>,
}

impl RequirementsValidator {
    /// Create a validator for `target` using the scanner configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is not a directory or a pattern fails to compile.
    pub fn new(target: impl AsRef<Path>, config: &ScannerConfig) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        if !target.is_dir() {
            return Err(Error::InvalidTarget { path: target });
        }

        let secrets = if config.secrets_enabled {
            Some(secrets_rule(&config.extra_secret_patterns)?)
        } else {
            None
        };
        let insecure_config = if config.insecure_config_enabled {
            Some(insecure_config_rule(&config.extra_config_patterns)?)
        } else {
            None
        };

        Ok(Self {
            target,
            secrets,
            insecure_config,
            extensions: config.extensions.clone(),
            excluded_dirs: config.excluded_dirs.clone(),
            max_file_bytes: config.max_file_bytes,
            findings: Vec::new(),
        })
    }

    /// Findings accumulated so far.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Scan for hardcoded secrets and credentials.
    pub fn scan_for_secrets(&mut self) {
        if let Some(rule) = &self.secrets {
            let found = self.scan_with(rule);
            self.findings.extend(found);
        }
    }

    /// Scan for insecure configuration values.
    pub fn scan_for_insecure_config(&mut self) {
        if let Some(rule) = &self.insecure_config {
            let found = self.scan_with(rule);
            self.findings.extend(found);
        }
    }

    /// Run every enabled check from a clean slate and build the report.
    pub fn validate(&mut self) -> ValidationReport {
        self.findings.clear();
        self.scan_for_secrets();
        self.scan_for_insecure_config();

        let by_severity = SeverityCounts::from_findings(&self.findings);
        let status = if self.findings.is_empty() {
            ValidationStatus::Pass
        } else {
            ValidationStatus::ReviewRequired
        };

        info!(
            target = %self.target.display(),
            findings = self.findings.len(),
            "Requirements validation finished"
        );

        ValidationReport {
            timestamp: report::timestamp(),
            target: self.target.display().to_string(),
            total_findings: self.findings.len(),
            by_severity,
            requirements_validated: true,
            findings: self.findings.clone(),
            status,
        }
    }

    /// Where a report named `output` is written: relative names resolve
    /// against the target directory.
    #[must_use]
    pub fn report_path(&self, output: impl AsRef<Path>) -> PathBuf {
        self.target.join(output)
    }

    /// Validate and write the JSON report, returning its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be written.
    pub fn generate_report(&mut self, output: impl AsRef<Path>) -> Result<PathBuf> {
        let results = self.validate();
        report::write_json(self.report_path(output), &results)
    }

    /// Files eligible for scanning, in a deterministic order.
    #[must_use]
    pub fn scannable_files(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.target)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded_dir(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable entry");
                    None
                }
            })
            // `Path::is_file` follows symlinks, `DirEntry::file_type` does not
            .filter(|entry| entry.path().is_file() && self.has_scanned_extension(entry))
            .map(DirEntry::into_path)
            .collect()
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.excluded_dirs.iter().any(|ex| ex == name))
    }

    fn has_scanned_extension(&self, entry: &DirEntry) -> bool {
        entry
            .file_name()
            .to_str()
            .is_some_and(|name| self.extensions.iter().any(|ext| name.ends_with(ext.as_str())))
    }

    fn scan_with(&self, rule: &ScanRule) -> Vec<Finding> {
        let mut found = Vec::new();

        for path in self.scannable_files() {
            let Some(content) = self.read_lossy(&path) else {
                continue;
            };
            let relative = self.relative_name(&path);

            for (index, line) in split_lines(&content).enumerate() {
                if let Some(pattern) = rule.first_match(line) {
                    trace!(
                        file = %relative,
                        line = index + 1,
                        pattern = %pattern.name,
                        "Pattern matched"
                    );
                    found.push(Finding::new(
                        pattern.finding_type.clone(),
                        rule.severity,
                        relative.clone(),
                        index + 1,
                        rule.requirement,
                    ));
                }
            }
        }

        found
    }

    fn read_lossy(&self, path: &Path) -> Option<String> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > self.max_file_bytes => {
                debug!(
                    "Skipping {} ({} bytes exceeds limit)",
                    path.display(),
                    meta.len()
                );
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                debug!("Skipping {}: {e}", path.display());
                return None;
            }
        }

        match std::fs::read(path) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                debug!("Skipping {}: {e}", path.display());
                None
            }
        }
    }

    fn relative_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.target).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Split on `\r\n`, `\r` and `\n`.
fn split_lines(content: &str) -> impl Iterator<Item = &str> + '_ {
    content.split('\n').flat_map(|line| {
        let line = line.strip_suffix('\r').unwrap_or(line);
        line.split('\r')
    })
}
