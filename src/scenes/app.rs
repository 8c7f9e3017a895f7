//! Top-level experience flow.

use crate::error::SequencerError;
use crate::sequencer::PhaseTable;

use super::COMPLETE;

pub const COUNTDOWN: &str = "countdown";
pub const INTRO: &str = "intro";
pub const CHAPTER: &str = "chapter";
pub const MAIN: &str = "main";

/// The outer flow: each stage hands off to the next when its nested
/// scene completes, ending at the scrollable main page.
pub fn table() -> Result<PhaseTable, SequencerError> {
    PhaseTable::builder("app")
        .phase(COUNTDOWN)
        .on_event(COMPLETE, INTRO)
        .phase(INTRO)
        .on_event(COMPLETE, CHAPTER)
        .phase(CHAPTER)
        .on_event(COMPLETE, MAIN)
        .phase(MAIN)
        .build()
}
