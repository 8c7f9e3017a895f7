//! Age-reveal chapter: poetic lines, a rolling number, the reveal.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Span;
use crate::error::SequencerError;
use crate::sequencer::PhaseTable;

use super::TAP;

pub const ROLL: &str = "roll";
pub const REVEAL: &str = "reveal";
pub const DONE: &str = "done";

/// Lines shown one at a time before the number rolls.
pub const POETIC_LINES: [&str; 4] = [
    "Before nineteen, there were...",
    "lessons that hurt,",
    "smiles that stayed,",
    "and moments that shaped you.",
];

/// Hold durations for the chapter choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChapterTimings {
    /// Hold between consecutive lines.
    pub line_hold: Span,
    /// Extra pause after the final line's hold, before the roll starts.
    pub pre_roll_pause: Span,
    /// How long the rolling number takes to settle.
    pub roll_settle: Span,
}

impl Default for ChapterTimings {
    fn default() -> Self {
        Self {
            line_hold: Span::from_millis(2000),
            pre_roll_pause: Span::from_millis(1000),
            roll_settle: Span::from_millis(4500),
        }
    }
}

/// Name of the `N`th line phase (1-based).
#[must_use]
pub fn line_phase(index: usize) -> String {
    format!("line-{index}")
}

/// The chapter flow: lines advance on timers into the roll, the roll
/// settles into the reveal, and a tap finishes.
pub fn table(timings: &ChapterTimings) -> Result<PhaseTable, SequencerError> {
    let mut builder = PhaseTable::builder("chapter");
    let count = POETIC_LINES.len();
    for i in 1..=count {
        builder = builder.phase(line_phase(i));
        builder = if i < count {
            builder.auto_after(timings.line_hold.into(), line_phase(i + 1))
        } else {
            // The final line gets its full hold, then the pre-roll pause.
            let hold = Duration::from(timings.line_hold)
                .saturating_add(timings.pre_roll_pause.into());
            builder.auto_after(hold, ROLL)
        };
    }
    builder
        .phase(ROLL)
        .auto_after(timings.roll_settle.into(), REVEAL)
        .phase(REVEAL)
        .on_event(TAP, DONE)
        .phase(DONE)
        .build()
}
