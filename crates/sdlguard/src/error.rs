//! Error types for sdlguard.
//!
//! This module defines all error types used throughout the sdlguard crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for sdlguard operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the roadmap database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Scanner Errors ===
    /// A scan pattern failed to compile.
    #[error("invalid pattern '{name}': {source}")]
    InvalidPattern {
        /// Name of the offending pattern.
        name: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The scan target does not exist or is not a directory.
    #[error("scan target {path} is not a directory")]
    InvalidTarget {
        /// The requested target path.
        path: PathBuf,
    },

    // === SDL State Errors ===
    /// An SDL state file could not be parsed.
    #[error("failed to parse SDL state {path}: {message}")]
    StateParse {
        /// Path to the state file.
        path: PathBuf,
        /// Description of the parse failure.
        message: String,
    },

    // === Roadmap Errors ===
    /// No initiative exists with the given ID.
    #[error("unknown initiative: {0}")]
    UnknownInitiative(String),

    /// No milestone exists with the given ID.
    #[error("unknown milestone: {0}")]
    UnknownMilestone(String),

    /// A value could not be parsed into a known variant.
    #[error("invalid {kind} '{value}', expected one of: {expected}")]
    InvalidValue {
        /// What kind of value was being parsed.
        kind: &'static str,
        /// The value as given.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// Path that couldn't be read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for sdlguard operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    #[must_use]
    pub fn invalid_value(
        kind: &'static str,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidValue {
            kind,
            value: value.into(),
            expected,
        }
    }

    /// Check if this error refers to a missing initiative.
    #[must_use]
    pub fn is_unknown_initiative(&self) -> bool {
        matches!(self, Self::UnknownInitiative(_))
    }
}
