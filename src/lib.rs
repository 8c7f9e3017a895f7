//! `stagecue` — a timeline sequencer for staged interactive
//! experiences.
//!
//! An experience is a set of flows, each a forward-only table of named
//! phases. Phases carry entry side-effect commands (confetti, chimes),
//! optional auto-advance timers, and named manual transitions; nested
//! scenes report completion upward until the outer flow reaches its
//! terminal phase. A generation counter keeps stale timers from firing
//! after a manual transition or disposal.

pub mod cli;
pub mod config;
pub mod diagram;
pub mod effects;
pub mod error;
pub mod experience;
pub mod observability;
pub mod progress;
pub mod scenes;
pub mod sequencer;
