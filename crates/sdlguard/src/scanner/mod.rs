//! Automated security requirements validation.
//!
//! The scanner walks a source tree and checks each eligible file, line by
//! line, against two requirements:
//!
//! - **CRED-001**: no hardcoded secrets (API keys, passwords, tokens, long
//!   base64 blobs). Commented-out lines are ignored.
//! - **CONFIG-001**: secure default configuration (debug mode, disabled TLS
//!   or certificate verification).
//!
//! # Example
//!
//! ```no_run
//! use sdlguard::config::ScannerConfig;
//! use sdlguard::scanner::RequirementsValidator;
//!
//! let mut validator = RequirementsValidator::new(".", &ScannerConfig::default())?;
//! let report = validator.validate();
//! println!("{} findings", report.total_findings);
//! # Ok::<(), sdlguard::Error>(())
//! ```

mod finding;
mod patterns;
mod validator;

pub use finding::{Finding, Severity, SeverityCounts};
pub use patterns::{
    insecure_config_rule, secrets_rule, ScanPattern, ScanRule, CONFIG_REQUIREMENT,
    SECRETS_REQUIREMENT,
};
pub use validator::{RequirementsValidator, ValidationReport, ValidationStatus};
