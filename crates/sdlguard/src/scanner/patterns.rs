//! Built-in scan rules.
//!
//! A [`ScanRule`] groups patterns that enforce one security requirement.
//! Each line of a scanned file is tested against a rule's patterns in
//! order; the first match produces a finding and the rest are skipped.

use regex::{Regex, RegexBuilder};

use super::finding::Severity;
use crate::error::{Error, Result};

/// Requirement enforced by the secret detection rule.
pub const SECRETS_REQUIREMENT: &str = "CRED-001: No hardcoded secrets";

/// Requirement enforced by the insecure configuration rule.
pub const CONFIG_REQUIREMENT: &str = "CONFIG-001: Secure default configuration";

/// A compiled scan pattern.
#[derive(Debug)]
pub struct ScanPattern {
    /// Name of the pattern for identification.
    pub name: String,

    /// Finding type reported when this pattern matches.
    pub finding_type: String,

    regex: Regex,
}

impl ScanPattern {
    /// Compile a new scan pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn new(
        name: impl Into<String>,
        finding_type: impl Into<String>,
        pattern: &str,
    ) -> Result<Self> {
        Self::build(name.into(), finding_type.into(), pattern, false)
    }

    /// Compile a new scan pattern that ignores ASCII and Unicode case.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn case_insensitive(
        name: impl Into<String>,
        finding_type: impl Into<String>,
        pattern: &str,
    ) -> Result<Self> {
        Self::build(name.into(), finding_type.into(), pattern, true)
    }

    fn build(name: String, finding_type: String, pattern: &str, ignore_case: bool) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|source| Error::InvalidPattern {
                name: name.clone(),
                source,
            })?;
        Ok(Self {
            name,
            finding_type,
            regex,
        })
    }

    /// Check if the line matches this pattern.
    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// A set of patterns enforcing a single requirement.
#[derive(Debug)]
pub struct ScanRule {
    /// Requirement reported on every finding of this rule.
    pub requirement: &'static str,

    /// Severity reported on every finding of this rule.
    pub severity: Severity,

    /// Skip lines whose first non-blank character is `#`.
    pub skip_comments: bool,

    /// Patterns in match priority order.
    pub patterns: Vec<ScanPattern>,
}

impl ScanRule {
    /// Return the first pattern matching `line`, honouring comment skipping.
    #[must_use]
    pub fn first_match(&self, line: &str) -> Option<&ScanPattern> {
        if self.skip_comments && line.trim_start().starts_with('#') {
            return None;
        }
        self.patterns.iter().find(|p| p.matches(line))
    }
}

/// Build the hardcoded secret rule, appending user-supplied patterns.
///
/// # Errors
///
/// Returns an error if a built-in or extra pattern fails to compile.
pub fn secrets_rule(extra_patterns: &[String]) -> Result<ScanRule> {
    let mut patterns = vec![
        ScanPattern::new(
            "api_key",
            "Hardcoded API key",
            r#"(?i)(api_key|apikey)\s*[=:]\s*["'][^"']+["']"#,
        )?,
        ScanPattern::new(
            "password",
            "Hardcoded password",
            r#"(?i)(password|passwd|pwd)\s*[=:]\s*["'][^"']+["']"#,
        )?,
        ScanPattern::new(
            "secret",
            "Hardcoded secret",
            r#"(?i)(secret|token)\s*[=:]\s*["'][^"']+["']"#,
        )?,
        ScanPattern::new(
            "base64_blob",
            "Potential base64 encoded secret",
            r"[A-Za-z0-9+/]{40,}={0,2}",
        )?,
    ];

    for (i, pattern) in extra_patterns.iter().enumerate() {
        patterns.push(ScanPattern::new(
            format!("custom_secret_{i}"),
            "Custom secret pattern",
            pattern,
        )?);
    }

    Ok(ScanRule {
        requirement: SECRETS_REQUIREMENT,
        severity: Severity::High,
        skip_comments: true,
        patterns,
    })
}

/// Build the insecure configuration rule, appending user-supplied patterns.
///
/// All patterns in this rule match case-insensitively, so `DEBUG = True`
/// and `debug=true` report the same finding.
///
/// # Errors
///
/// Returns an error if a built-in or extra pattern fails to compile.
pub fn insecure_config_rule(extra_patterns: &[String]) -> Result<ScanRule> {
    let mut patterns = vec![
        ScanPattern::case_insensitive(
            "debug_enabled",
            "Debug mode enabled in production",
            r"debug\s*=\s*true",
        )?,
        // Must precede ssl_disabled, which also matches "verify_ssl = false"
        ScanPattern::case_insensitive(
            "ssl_verify_disabled",
            "SSL verification disabled",
            r"verify_ssl\s*=\s*false",
        )?,
        ScanPattern::case_insensitive("ssl_disabled", "SSL/TLS disabled", r"ssl\s*=\s*false")?,
    ];

    for (i, pattern) in extra_patterns.iter().enumerate() {
        patterns.push(ScanPattern::case_insensitive(
            format!("custom_config_{i}"),
            "Custom insecure configuration pattern",
            pattern,
        )?);
    }

    Ok(ScanRule {
        requirement: CONFIG_REQUIREMENT,
        severity: Severity::Medium,
        skip_comments: false,
        patterns,
    })
}
