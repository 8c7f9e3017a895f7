//! Countdown scene: a wall-clock timer that unlocks the experience.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::SequencerError;
use crate::sequencer::{PhaseTable, Sequencer};

use super::{DEADLINE, OPEN};

pub const WAITING: &str = "waiting";
pub const EXPIRED: &str = "expired";
pub const DONE: &str = "done";

/// How often the clock re-checks the wall clock.
pub const DEFAULT_TICK: Duration = Duration::from_millis(250);

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Remaining time broken into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimeLeft {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeLeft {
    /// Decomposes a millisecond distance into days, hours, minutes and
    /// seconds by integer division. A negative distance (target already
    /// passed) yields all zeros.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn decompose(remaining_ms: i64) -> Self {
        if remaining_ms < 0 {
            return Self {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 0,
            };
        }
        Self {
            days: (remaining_ms / MS_PER_DAY) as u64,
            hours: ((remaining_ms % MS_PER_DAY) / MS_PER_HOUR) as u64,
            minutes: ((remaining_ms % MS_PER_HOUR) / MS_PER_MINUTE) as u64,
            seconds: ((remaining_ms % MS_PER_MINUTE) / MS_PER_SECOND) as u64,
        }
    }
}

impl std::fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// The countdown flow: the clock fires `deadline` when the target
/// instant passes, then the user opens their gift.
pub fn table() -> Result<PhaseTable, SequencerError> {
    PhaseTable::builder("countdown")
        .phase(WAITING)
        .on_event(DEADLINE, EXPIRED)
        .phase(EXPIRED)
        .on_event(OPEN, DONE)
        .phase(DONE)
        .build()
}

/// Drives the `waiting` phase against the wall clock.
#[derive(Debug, Clone, Copy)]
pub struct CountdownClock {
    target: DateTime<Utc>,
    tick: Duration,
}

impl CountdownClock {
    #[must_use]
    pub const fn new(target: DateTime<Utc>) -> Self {
        Self {
            target,
            tick: DEFAULT_TICK,
        }
    }

    #[must_use]
    pub const fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    #[must_use]
    pub const fn target(&self) -> DateTime<Utc> {
        self.target
    }

    /// Signed milliseconds until the target; negative once passed.
    #[must_use]
    pub fn remaining_ms(&self) -> i64 {
        (self.target - Utc::now()).num_milliseconds()
    }

    #[must_use]
    pub fn time_left(&self) -> TimeLeft {
        TimeLeft::decompose(self.remaining_ms())
    }

    /// Polls the wall clock until the target passes, then fires
    /// `deadline` on `sequencer` and returns. Returns early without
    /// error if the sequencer is disposed while waiting.
    ///
    /// # Errors
    ///
    /// Propagates [`SequencerError`] from the deadline advance.
    pub async fn run(&self, sequencer: &Arc<Sequencer>) -> Result<(), SequencerError> {
        let mut interval = tokio::time::interval(self.tick);
        loop {
            interval.tick().await;
            if sequencer.is_disposed() {
                debug!("countdown clock stopping; sequencer disposed");
                return Ok(());
            }
            if self.remaining_ms() < 0 {
                sequencer.advance(DEADLINE)?;
                return Ok(());
            }
        }
    }
}
