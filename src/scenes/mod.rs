//! Scene definitions.
//!
//! Each scene contributes a [`PhaseTable`](crate::sequencer::PhaseTable)
//! describing its internal flow, plus whatever scene-specific state it
//! carries (countdown clock, quiz score). Timings come from
//! configuration; the defaults match the choreography the experience
//! was designed with.

pub mod app;
pub mod bottle;
pub mod chapter;
pub mod countdown;
pub mod finale;
pub mod intro;
pub mod quiz;

/// Generic user interaction: a click or tap anywhere the scene accepts one.
pub const TAP: &str = "tap";
/// The expired countdown's "open your gift" action.
pub const OPEN: &str = "open";
/// A nested scene finished; advances the parent flow.
pub const COMPLETE: &str = "complete";
/// The countdown clock crossed its target instant.
pub const DEADLINE: &str = "deadline";
