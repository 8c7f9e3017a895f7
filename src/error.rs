//! Error types for `stagecue`.
//!
//! Per-domain error enums aggregated into a single top-level error with
//! exit-code mapping for the CLI.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `stagecue` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Sequencer error (disposed handle, malformed phase table)
    pub const SEQUENCER_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `stagecue` operations.
///
/// Aggregates all domain-specific errors and provides a unified
/// interface for error handling and exit code mapping.
#[derive(Debug, Error)]
pub enum StagecueError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Sequencer error
    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    /// Effect dispatch error
    #[error(transparent)]
    Effect(#[from] EffectError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl StagecueError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Sequencer(_) => ExitCode::SEQUENCER_ERROR,
            Self::Effect(_) => ExitCode::ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path to the configuration file
        path: PathBuf,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("configuration too large: {size} bytes (limit: {limit})")]
    TooLarge {
        /// Actual file size in bytes
        size: usize,
        /// Configured size limit in bytes
        limit: usize,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "intro.message_holds")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Validation failure that prevents the configuration from being used
    Error,
    /// Potential issue that does not prevent configuration loading
    Warning,
}

// ============================================================================
// Sequencer Errors
// ============================================================================

/// Timeline sequencer errors.
///
/// Unknown events are deliberately NOT represented here: firing an event
/// the current phase does not define is a silent no-op, not an error.
#[derive(Debug, Error)]
pub enum SequencerError {
    /// Method called on a disposed sequencer handle
    #[error("sequencer for flow '{flow}' is disposed (called {method})")]
    Disposed {
        /// Flow whose sequencer was disposed
        flow: String,
        /// Method that was called after disposal
        method: &'static str,
    },

    /// Phase table failed structural validation
    #[error("invalid phase table for flow '{flow}': {message}")]
    InvalidTable {
        /// Flow the table belongs to
        flow: String,
        /// What is wrong with the table
        message: String,
    },

    /// Referenced phase does not exist in the table
    #[error("phase not found in flow '{flow}': {phase}")]
    PhaseNotFound {
        /// Flow that was searched
        flow: String,
        /// Phase name that was not found
        phase: String,
    },
}

// ============================================================================
// Effect Errors
// ============================================================================

/// Effect executor errors.
///
/// These never cross the sequencer boundary: dispatch catches them,
/// logs a warning, and lets the flow continue.
#[derive(Debug, Error)]
pub enum EffectError {
    /// The executor failed to run a command
    #[error("effect '{command}' failed: {message}")]
    DispatchFailed {
        /// Name of the command that failed
        command: String,
        /// Executor-provided failure description
        message: String,
    },

    /// The executor does not recognize the command
    #[error("unsupported effect command: {0}")]
    Unsupported(String),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `stagecue` operations.
pub type Result<T> = std::result::Result<T, StagecueError>;

// ============================================================================
// Tests
// ============================================================================
