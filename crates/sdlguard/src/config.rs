//! Configuration management for sdlguard.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "sdlguard";

/// Default roadmap database file name.
const DATABASE_FILE_NAME: &str = "roadmap.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SDLGUARD_`, sections separated by `__`)
/// 2. TOML config file at `~/.config/sdlguard/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Requirements scanner configuration.
    pub scanner: ScannerConfig,
    /// Roadmap tracker configuration.
    pub roadmap: RoadmapConfig,
    /// Default report file names.
    pub reports: ReportsConfig,
}

/// Requirements scanner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Enable hardcoded secret detection.
    pub secrets_enabled: bool,
    /// Enable insecure configuration detection.
    pub insecure_config_enabled: bool,
    /// File name suffixes that are scanned.
    pub extensions: Vec<String>,
    /// Directory names skipped anywhere in the tree.
    pub excluded_dirs: Vec<String>,
    /// Files larger than this are skipped.
    pub max_file_bytes: u64,
    /// Additional secret patterns (regex), reported as high severity.
    pub extra_secret_patterns: Vec<String>,
    /// Additional insecure configuration patterns (regex, case-insensitive),
    /// reported as medium severity.
    pub extra_config_patterns: Vec<String>,
}

/// Roadmap tracker configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadmapConfig {
    /// Path to the roadmap database.
    /// Defaults to `~/.local/share/sdlguard/roadmap.db`
    pub database_path: Option<PathBuf>,
}

/// Default output file names for generated reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Requirements validation report, relative to the scanned directory.
    pub validation_report: String,
    /// SDL gap analysis report.
    pub gap_report: String,
    /// STRIDE threat model.
    pub threat_model: String,
    /// Roadmap export.
    pub roadmap_export: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            secrets_enabled: true,
            insecure_config_enabled: true,
            extensions: default_extensions(),
            excluded_dirs: default_excluded_dirs(),
            max_file_bytes: 5 * 1024 * 1024,
            extra_secret_patterns: Vec::new(),
            extra_config_patterns: Vec::new(),
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            validation_report: "security_validation_report.json".to_string(),
            gap_report: "sdl_gap_analysis.json".to_string(),
            threat_model: "threat_model.json".to_string(),
            roadmap_export: "security_roadmap.json".to_string(),
        }
    }
}

/// Default scanned file suffixes.
fn default_extensions() -> Vec<String> {
    [".py", ".js", ".ts", ".json", ".yaml", ".yml", ".env"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Default directories to skip.
fn default_excluded_dirs() -> Vec<String> {
    [".git", "node_modules", "__pycache__", ".venv", "venv"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SDLGUARD_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let scanner = &self.scanner;

        if scanner.extensions.is_empty() {
            return Err(Error::config_validation(
                "scanner.extensions must list at least one suffix",
            ));
        }

        if let Some(ext) = scanner.extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(Error::config_validation(format!(
                "scanner extension '{ext}' must start with '.'"
            )));
        }

        if scanner.max_file_bytes == 0 {
            return Err(Error::config_validation(
                "scanner.max_file_bytes must be greater than 0",
            ));
        }

        for pattern in scanner
            .extra_secret_patterns
            .iter()
            .chain(&scanner.extra_config_patterns)
        {
            if regex::Regex::new(pattern).is_err() {
                return Err(Error::config_validation(format!(
                    "invalid regex pattern: {pattern}"
                )));
            }
        }

        let reports = &self.reports;
        for (key, value) in [
            ("validation_report", &reports.validation_report),
            ("gap_report", &reports.gap_report),
            ("threat_model", &reports.threat_model),
            ("roadmap_export", &reports.roadmap_export),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config_validation(format!(
                    "reports.{key} must not be empty"
                )));
            }
        }

        Ok(())
    }

    /// Get the roadmap database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.roadmap
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.scanner.secrets_enabled);
        assert!(config.scanner.insecure_config_enabled);
        assert!(config.roadmap.database_path.is_none());
    }

    #[test]
    fn test_default_scanner_config() {
        let scanner = ScannerConfig::default();

        assert_eq!(scanner.extensions.len(), 7);
        assert!(scanner.extensions.contains(&".env".to_string()));
        assert!(scanner.excluded_dirs.contains(&"node_modules".to_string()));
        assert!(scanner.extra_secret_patterns.is_empty());
    }

    #[test]
    fn test_default_reports_config() {
        let reports = ReportsConfig::default();

        assert_eq!(reports.validation_report, "security_validation_report.json");
        assert_eq!(reports.gap_report, "sdl_gap_analysis.json");
        assert_eq!(reports.threat_model, "threat_model.json");
        assert_eq!(reports.roadmap_export, "security_roadmap.json");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_extensions() {
        let mut config = Config::default();
        config.scanner.extensions.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("extensions"));
    }

    #[test]
    fn test_validate_extension_without_dot() {
        let mut config = Config::default();
        config.scanner.extensions = vec!["py".to_string()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("'py'"));
    }

    #[test]
    fn test_validate_zero_max_file_bytes() {
        let mut config = Config::default();
        config.scanner.max_file_bytes = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_file_bytes"));
    }

    #[test]
    fn test_validate_invalid_regex() {
        let mut config = Config::default();
        config.scanner.extra_config_patterns = vec!["[invalid".to_string()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("invalid regex"));
    }

    #[test]
    fn test_validate_empty_report_name() {
        let mut config = Config::default();
        config.reports.gap_report = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("reports.gap_report"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("roadmap.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.roadmap.database_path = Some(PathBuf::from("/custom/roadmap.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/roadmap.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("sdlguard"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[scanner]
secrets_enabled = false
extensions = [".rs", ".toml"]

[reports]
threat_model = "model.json"
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert!(!config.scanner.secrets_enabled);
        assert_eq!(config.scanner.extensions, vec![".rs", ".toml"]);
        assert_eq!(config.reports.threat_model, "model.json");
        // Untouched sections keep their defaults
        assert!(config.scanner.insecure_config_enabled);
        assert_eq!(config.reports.gap_report, "sdl_gap_analysis.json");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scanner]\nmax_file_bytes = 0\n").unwrap();

        assert!(Config::load_from(Some(path)).is_err());
    }

    #[test]
    fn test_scanner_config_deserialize_partial() {
        let json = r#"{"max_file_bytes": 1024}"#;
        let scanner: ScannerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(scanner.max_file_bytes, 1024);
        assert!(scanner.secrets_enabled);
    }
}
