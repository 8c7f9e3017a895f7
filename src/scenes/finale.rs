//! Terminal scene selection.
//!
//! The main page ends in one of two interchangeable finale scenes. Both
//! expose a forward-only flow ending in a terminal `revealed` phase; the
//! configuration picks which one mounts.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::effects::EffectCommand;
use crate::error::SequencerError;
use crate::sequencer::PhaseTable;

use super::bottle::{self, BottleTimings};
use super::TAP;

/// Which finale the main page mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinaleKind {
    /// Message in a bottle: float, cork pop, reveal.
    #[default]
    Bottle,
    /// Single-tap surprise reveal with confetti cannons.
    Surprise,
}

impl std::fmt::Display for FinaleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bottle => f.write_str("bottle"),
            Self::Surprise => f.write_str("surprise"),
        }
    }
}

/// A scene that can close out the experience.
pub trait TerminalScene: Send + Sync {
    fn name(&self) -> &'static str;

    /// Builds this scene's flow. Its last phase must be terminal.
    fn table(&self) -> Result<PhaseTable, SequencerError>;
}

/// The bottle finale.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageInBottle {
    pub timings: BottleTimings,
}

impl TerminalScene for MessageInBottle {
    fn name(&self) -> &'static str {
        "message-in-bottle"
    }

    fn table(&self) -> Result<PhaseTable, SequencerError> {
        bottle::table(&self.timings)
    }
}

/// The surprise finale: hidden until tapped, then a confetti storm.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinalSurprise;

pub const HIDDEN: &str = "hidden";
pub const REVEALED: &str = "revealed";

impl TerminalScene for FinalSurprise {
    fn name(&self) -> &'static str {
        "final-surprise"
    }

    fn table(&self) -> Result<PhaseTable, SequencerError> {
        PhaseTable::builder("surprise")
            .phase(HIDDEN)
            .on_event(TAP, REVEALED)
            .phase(REVEALED)
            .on_enter(EffectCommand::new("confetti-burst").with_param("particles", json!(150)))
            .on_enter(
                EffectCommand::new("confetti-burst")
                    .with_param("origin", json!("sides"))
                    .with_param("delay_ms", json!(1000)),
            )
            .on_enter(EffectCommand::new("chime"))
            .build()
    }
}

/// Builds the configured finale.
#[must_use]
pub fn select(kind: FinaleKind, bottle: BottleTimings) -> Box<dyn TerminalScene> {
    match kind {
        FinaleKind::Bottle => Box::new(MessageInBottle { timings: bottle }),
        FinaleKind::Surprise => Box::new(FinalSurprise),
    }
}
