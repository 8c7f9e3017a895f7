//! Forward-only phase sequencing.
//!
//! A flow is described by a [`PhaseTable`] (an ordered list of named
//! phases with entry effects, optional auto-advance timers, and named
//! manual transitions) and driven by a [`Sequencer`].

mod engine;
mod table;

pub use engine::{Advance, CompleteHook, EnterHook, Sequencer};
pub use table::{AutoAdvance, Phase, PhaseTable, PhaseTableBuilder};
