//! Message-in-a-bottle finale scene.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::Span;
use crate::effects::EffectCommand;
use crate::error::SequencerError;
use crate::sequencer::PhaseTable;

use super::OPEN;

pub const FLOATING: &str = "floating";
pub const OPENING: &str = "opening";
pub const REVEALED: &str = "revealed";

/// Hold durations for the bottle choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BottleTimings {
    /// How long the cork-pop plays before the message shows.
    pub cork_pop: Span,
    /// Delay before the confetti burst, timed to the cork leaving.
    pub confetti_delay: Span,
}

impl Default for BottleTimings {
    fn default() -> Self {
        Self {
            cork_pop: Span::from_millis(1500),
            confetti_delay: Span::from_millis(800),
        }
    }
}

/// The bottle flow: it floats until opened; opening plays the cork pop
/// with confetti and chime, then the message is revealed.
pub fn table(timings: &BottleTimings) -> Result<PhaseTable, SequencerError> {
    PhaseTable::builder("bottle")
        .phase(FLOATING)
        .on_event(OPEN, OPENING)
        .phase(OPENING)
        .on_enter(
            EffectCommand::new("confetti-burst")
                .with_param("delay_ms", json!(timings.confetti_delay.as_millis())),
        )
        .on_enter(EffectCommand::new("chime"))
        .auto_after(timings.cork_pop.into(), REVEALED)
        .phase(REVEALED)
        .build()
}
