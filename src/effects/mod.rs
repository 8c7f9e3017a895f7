//! Side-effect commands and executors.
//!
//! Side effects are decorative actions ("confetti-burst", "chime") fired on
//! phase entry. They are opaque to the sequencer: dispatch is synchronous,
//! fire-and-forget, and a failing or absent executor never blocks or fails
//! a phase transition.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

pub use crate::error::EffectError;

// ============================================================================
// EffectCommand
// ============================================================================

/// An opaque side-effect instruction: a command name plus a parameter bag.
///
/// The sequencer never inspects the parameters; only executors do.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EffectCommand {
    /// Command name, e.g. `"confetti-burst"` or `"chime"`.
    pub name: String,
    /// Parameters interpreted by the executor.
    #[serde(default)]
    pub params: HashMap<String, Value>,
}

impl EffectCommand {
    /// Creates a command with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: HashMap::new(),
        }
    }

    /// Adds a parameter, builder-style.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Display for EffectCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ============================================================================
// Parameter extraction helpers
// ============================================================================

/// Reads a `u64` parameter, falling back to `default`.
#[must_use]
pub fn extract_u64(params: &HashMap<String, Value>, key: &str, default: u64) -> u64 {
    params.get(key).and_then(Value::as_u64).unwrap_or(default)
}

/// Reads a string parameter, falling back to `default`.
#[must_use]
pub fn extract_string(params: &HashMap<String, Value>, key: &str, default: &str) -> String {
    params
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

// ============================================================================
// EffectExecutor trait
// ============================================================================

/// Executes side-effect commands.
///
/// Implementations run particle animation, audio synthesis, or nothing at
/// all; the sequencer only requires that `execute` returns promptly and
/// that repeated dispatch of the same command is safe.
pub trait EffectExecutor: Send + Sync {
    /// Runs a single command.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError`] when the command cannot be performed. The
    /// caller logs and swallows this; it never reaches the sequencer.
    fn execute(&self, command: &EffectCommand) -> Result<(), EffectError>;

    /// Human-readable executor name for logging.
    fn name(&self) -> &'static str;
}

// ============================================================================
// NullExecutor
// ============================================================================

/// Executor that silently discards every command.
///
/// The default when no effect backend is wired up: missing confetti just
/// means no confetti.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullExecutor;

impl EffectExecutor for NullExecutor {
    fn execute(&self, _command: &EffectCommand) -> Result<(), EffectError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

// ============================================================================
// TracingExecutor
// ============================================================================

/// Executor that logs each command through `tracing`.
///
/// Used by the headless CLI runner so effect dispatch is visible in the
/// phase log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingExecutor;

impl EffectExecutor for TracingExecutor {
    fn execute(&self, command: &EffectCommand) -> Result<(), EffectError> {
        let delay_ms = extract_u64(&command.params, "delay_ms", 0);
        if delay_ms > 0 {
            debug!(command = %command.name, delay_ms, "effect deferred by executor");
        }
        tracing::info!(command = %command.name, params = ?command.params, "effect");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}

// ============================================================================
// Dispatch boundary
// ============================================================================

/// Dispatches a batch of commands, swallowing executor failures.
///
/// Failures are logged at `warn` level and never propagated: a broken
/// sound or confetti effect must not block scene progression.
pub fn dispatch_all(executor: &dyn EffectExecutor, commands: &[EffectCommand]) {
    for command in commands {
        if let Err(e) = executor.execute(command) {
            warn!(
                executor = executor.name(),
                command = %command.name,
                error = %e,
                "effect dispatch failed; continuing"
            );
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingExecutor {
        seen: Mutex<Vec<String>>,
    }

    impl RecordingExecutor {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl EffectExecutor for RecordingExecutor {
        fn execute(&self, command: &EffectCommand) -> Result<(), EffectError> {
            self.seen.lock().unwrap().push(command.name.clone());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    struct FailingExecutor;

    impl EffectExecutor for FailingExecutor {
        fn execute(&self, command: &EffectCommand) -> Result<(), EffectError> {
            Err(EffectError::DispatchFailed {
                command: command.name.clone(),
                message: "audio device unavailable".to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn test_command_builder() {
        let cmd = EffectCommand::new("confetti-burst")
            .with_param("particle_count", 100)
            .with_param("origin_y", 0.6);
        assert_eq!(cmd.name, "confetti-burst");
        assert_eq!(extract_u64(&cmd.params, "particle_count", 0), 100);
    }

    #[test]
    fn test_extract_u64_default() {
        let cmd = EffectCommand::new("chime");
        assert_eq!(extract_u64(&cmd.params, "delay_ms", 800), 800);
    }

    #[test]
    fn test_extract_string() {
        let cmd = EffectCommand::new("chime").with_param("tone", "soft");
        assert_eq!(extract_string(&cmd.params, "tone", "default"), "soft");
        assert_eq!(extract_string(&cmd.params, "missing", "default"), "default");
    }

    #[test]
    fn test_dispatch_all_in_order() {
        let exec = RecordingExecutor::new();
        let commands = vec![
            EffectCommand::new("chime"),
            EffectCommand::new("confetti-burst"),
        ];
        dispatch_all(&exec, &commands);
        assert_eq!(
            *exec.seen.lock().unwrap(),
            vec!["chime".to_string(), "confetti-burst".to_string()]
        );
    }

    #[test]
    fn test_dispatch_all_swallows_failures() {
        let commands = vec![EffectCommand::new("chime")];
        // Must not panic or propagate
        dispatch_all(&FailingExecutor, &commands);
    }

    #[test]
    fn test_null_executor_accepts_anything() {
        let cmd = EffectCommand::new("unknown-effect").with_param("x", 1);
        assert!(NullExecutor.execute(&cmd).is_ok());
    }

    #[test]
    fn test_command_deserializes_from_yaml() {
        let cmd: EffectCommand = serde_yaml::from_str(
            "name: confetti-burst\nparams:\n  particle_count: 100\n  delay_ms: 800\n",
        )
        .unwrap();
        assert_eq!(cmd.name, "confetti-burst");
        assert_eq!(extract_u64(&cmd.params, "delay_ms", 0), 800);
    }

    #[test]
    fn test_command_display() {
        assert_eq!(EffectCommand::new("chime").to_string(), "chime");
    }
}
