//! Shared helpers for integration tests.
// Each integration test binary compiles this module and uses a subset.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use stagecue::effects::{EffectCommand, EffectExecutor};
use stagecue::error::EffectError;
use stagecue::experience::SceneRenderer;

/// Path to a YAML fixture under `tests/fixtures/`.
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Records every dispatched effect command.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub commands: Mutex<Vec<EffectCommand>>,
}

impl RecordingExecutor {
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }
}

impl EffectExecutor for RecordingExecutor {
    fn execute(&self, command: &EffectCommand) -> Result<(), EffectError> {
        self.commands.lock().unwrap().push(command.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Records every rendered phase and line.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub events: Mutex<Vec<String>>,
}

impl RecordingRenderer {
    #[must_use]
    pub fn phases(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| !e.starts_with("line:"))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| e.strip_prefix("line:").map(ToString::to_string))
            .collect()
    }
}

impl SceneRenderer for RecordingRenderer {
    fn phase_entered(&self, flow: &str, phase: &str) {
        self.events.lock().unwrap().push(format!("{flow}/{phase}"));
    }

    fn line(&self, text: &str) {
        self.events.lock().unwrap().push(format!("line:{text}"));
    }
}

/// An `Arc`ed pair of recorders ready to hand to an `Experience`.
#[must_use]
pub fn recorders() -> (Arc<RecordingExecutor>, Arc<RecordingRenderer>) {
    (
        Arc::new(RecordingExecutor::default()),
        Arc::new(RecordingRenderer::default()),
    )
}
