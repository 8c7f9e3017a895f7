//! Intro scene: greeting, invitation, timed message sequence, reveal.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Span;
use crate::error::SequencerError;
use crate::sequencer::PhaseTable;

use super::TAP;

pub const GREET: &str = "greet";
pub const INVITE: &str = "invite";
pub const REVEAL: &str = "reveal";
pub const DONE: &str = "done";

/// Message shown while each `message-N` phase holds.
pub const MESSAGES: [&str; 3] = [
    "Today is special 🎂",
    "Because you exist 💖",
    "And you mean so much to me...",
];

/// Hold durations for the intro choreography.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntroTimings {
    /// How long the greeting holds before inviting a tap.
    pub greet_hold: Span,
    /// Hold per message; the sequence has one phase per entry.
    pub message_holds: Vec<Span>,
}

impl Default for IntroTimings {
    fn default() -> Self {
        Self {
            greet_hold: Span::from_millis(3000),
            message_holds: vec![
                Span::from_millis(2500),
                Span::from_millis(2500),
                Span::from_millis(3000),
            ],
        }
    }
}

/// Name of the `N`th message phase (1-based).
#[must_use]
pub fn message_phase(index: usize) -> String {
    format!("message-{index}")
}

/// The intro flow: greet holds, a tap on the invitation starts the
/// timed message sequence, and a tap on the reveal finishes.
pub fn table(timings: &IntroTimings) -> Result<PhaseTable, SequencerError> {
    let mut builder = PhaseTable::builder("intro")
        .phase(GREET)
        .auto_after(timings.greet_hold.into(), INVITE)
        .phase(INVITE);
    builder = if timings.message_holds.is_empty() {
        builder.on_event(TAP, REVEAL)
    } else {
        builder.on_event(TAP, message_phase(1))
    };
    for (i, hold) in timings.message_holds.iter().enumerate() {
        let next = if i + 1 == timings.message_holds.len() {
            REVEAL.to_string()
        } else {
            message_phase(i + 2)
        };
        builder = builder
            .phase(message_phase(i + 1))
            .auto_after(Duration::from(*hold), next);
    }
    builder
        .phase(REVEAL)
        .on_event(TAP, DONE)
        .phase(DONE)
        .build()
}
