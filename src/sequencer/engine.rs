//! Timeline sequencer engine.
//!
//! The `Sequencer` advances one flow through its phase table: manual
//! events arrive via [`Sequencer::advance`], automatic transitions are
//! scheduled as delayed tokio tasks keyed to a generation counter, and
//! entry effects plus phase-enter callbacks run synchronously before a
//! transition returns.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::effects::{EffectCommand, EffectExecutor, NullExecutor, dispatch_all};
use crate::error::SequencerError;

use super::table::{Phase, PhaseTable};

/// Result of [`Sequencer::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The event was defined for the current phase; the sequencer moved.
    Changed {
        /// Name of the newly entered phase.
        phase: String,
    },
    /// The event is not defined for the current phase; nothing happened.
    /// Unrecognized events are ignored, not errors.
    Unchanged,
}

/// Callback invoked synchronously on every phase entry.
pub type EnterHook = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// One-shot callback invoked when the flow reaches its terminal phase.
pub type CompleteHook = Box<dyn FnOnce() + Send>;

struct Inner {
    current: usize,
    /// Bumped on every transition; a scheduled timer captures the value
    /// at schedule time and is a no-op if it differs when the timer fires.
    generation: u64,
    started: bool,
    disposed: bool,
    enter_hooks: Vec<EnterHook>,
    complete_hook: Option<CompleteHook>,
}

/// Timeline sequencer for a single flow.
///
/// Exactly one phase is current at any time. The sequencer only moves
/// forward; it is created when its scene mounts and disposed (with any
/// pending timers) when the scene unmounts.
pub struct Sequencer {
    table: Arc<PhaseTable>,
    executor: Arc<dyn EffectExecutor>,
    inner: Mutex<Inner>,
    cancel: CancellationToken,
}

/// What a transition left to do once the state lock is released.
struct EnterWork {
    phase_name: String,
    effects: Vec<EffectCommand>,
    hooks: Vec<EnterHook>,
    auto: Option<(Duration, u64)>,
}

impl Sequencer {
    /// Creates a sequencer positioned at the table's entry phase.
    ///
    /// Nothing runs until [`start`](Self::start): entry effects for the
    /// initial phase and its auto-advance timer are deferred so callers
    /// can register hooks first.
    #[must_use]
    pub fn create(table: PhaseTable, executor: Arc<dyn EffectExecutor>) -> Arc<Self> {
        Arc::new(Self {
            table: Arc::new(table),
            executor,
            inner: Mutex::new(Inner {
                current: 0,
                generation: 0,
                started: false,
                disposed: false,
                enter_hooks: Vec::new(),
                complete_hook: None,
            }),
            cancel: CancellationToken::new(),
        })
    }

    /// Creates a sequencer with no effect backend.
    #[must_use]
    pub fn create_silent(table: PhaseTable) -> Arc<Self> {
        Self::create(table, Arc::new(NullExecutor))
    }

    /// The phase table driving this sequencer.
    #[must_use]
    pub const fn table(&self) -> &Arc<PhaseTable> {
        &self.table
    }

    /// Registers a phase-enter callback, invoked as `hook(flow, phase)`.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Disposed`] after disposal.
    pub fn on_phase_enter(&self, hook: EnterHook) -> Result<(), SequencerError> {
        let mut inner = self.lock("on_phase_enter")?;
        inner.enter_hooks.push(hook);
        Ok(())
    }

    /// Registers the completion callback, invoked exactly once when the
    /// flow enters its terminal phase. A second registration replaces an
    /// unfired first one.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Disposed`] after disposal.
    pub fn on_complete(&self, hook: CompleteHook) -> Result<(), SequencerError> {
        let mut inner = self.lock("on_complete")?;
        inner.complete_hook = Some(hook);
        Ok(())
    }

    /// Enters the initial phase: dispatches its entry effects, runs the
    /// enter hooks, and schedules its auto-advance timer if any.
    ///
    /// Calling `start` twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Disposed`] after disposal.
    pub fn start(self: &Arc<Self>) -> Result<(), SequencerError> {
        let work = {
            let mut inner = self.lock("start")?;
            if inner.started {
                return Ok(());
            }
            inner.started = true;
            self.enter_work(&inner, inner.current)
        };
        self.run_enter_work(work);
        Ok(())
    }

    /// Fires a named event against the current phase.
    ///
    /// If the phase defines a transition for `event`, the sequencer moves
    /// to the target phase, bumps the generation counter (invalidating any
    /// pending timer), and dispatches the new phase's entry effects and
    /// enter hooks before returning. If not, returns
    /// [`Advance::Unchanged`] without error.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Disposed`] after disposal.
    pub fn advance(self: &Arc<Self>, event: &str) -> Result<Advance, SequencerError> {
        let work = {
            let mut inner = self.lock("advance")?;
            let phase = &self.table.phases()[inner.current];
            let Some(&target) = phase.transitions().get(event) else {
                debug!(
                    flow = self.table.flow(),
                    phase = phase.name(),
                    event,
                    "event not defined for phase; ignored"
                );
                return Ok(Advance::Unchanged);
            };
            info!(
                flow = self.table.flow(),
                from = phase.name(),
                to = self.table.phases()[target].name(),
                event,
                "phase transition"
            );
            self.transition(&mut inner, target)
        };
        let phase = work.phase_name.clone();
        self.run_enter_work(work);
        Ok(Advance::Changed { phase })
    }

    /// Name of the current phase.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Disposed`] after disposal.
    pub fn current_phase(&self) -> Result<String, SequencerError> {
        let inner = self.lock("current_phase")?;
        Ok(self.table.phases()[inner.current].name().to_string())
    }

    /// Whether the current phase is terminal.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Disposed`] after disposal.
    pub fn is_terminal(&self) -> Result<bool, SequencerError> {
        let inner = self.lock("is_terminal")?;
        Ok(self.table.phases()[inner.current].is_terminal())
    }

    /// Current generation counter. Exposed for tests and diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Disposed`] after disposal.
    pub fn generation(&self) -> Result<u64, SequencerError> {
        Ok(self.lock("generation")?.generation)
    }

    /// Whether this sequencer has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.lock().map_or(true, |inner| inner.disposed)
    }

    /// Disposes the sequencer: cancels pending timers and detaches all
    /// callbacks. Any method called afterwards fails with
    /// [`SequencerError::Disposed`]. Disposing twice is a no-op.
    pub fn dispose(&self) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        inner.enter_hooks.clear();
        inner.complete_hook = None;
        drop(inner);
        self.cancel.cancel();
        debug!(flow = self.table.flow(), "sequencer disposed");
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lock(&self, method: &'static str) -> Result<MutexGuard<'_, Inner>, SequencerError> {
        let inner = self.inner.lock().map_err(|_| SequencerError::Disposed {
            flow: self.table.flow().to_string(),
            method,
        })?;
        if inner.disposed {
            return Err(SequencerError::Disposed {
                flow: self.table.flow().to_string(),
                method,
            });
        }
        Ok(inner)
    }

    /// Moves to `target` under the lock and returns the follow-up work.
    fn transition(&self, inner: &mut Inner, target: usize) -> EnterWork {
        inner.current = target;
        inner.generation += 1;
        self.enter_work(inner, target)
    }

    /// Captures everything phase entry needs so it can run after the
    /// lock is released (hooks may call back into the sequencer).
    fn enter_work(&self, inner: &Inner, index: usize) -> EnterWork {
        let phase = &self.table.phases()[index];
        EnterWork {
            phase_name: phase.name().to_string(),
            effects: phase.on_enter().to_vec(),
            hooks: inner.enter_hooks.clone(),
            auto: phase.auto().map(|a| (a.after, inner.generation)),
        }
    }

    /// Dispatches entry effects, runs enter hooks, fires completion, and
    /// schedules the auto-advance timer, in that order.
    fn run_enter_work(self: &Arc<Self>, work: EnterWork) {
        dispatch_all(self.executor.as_ref(), &work.effects);
        for hook in &work.hooks {
            hook(self.table.flow(), &work.phase_name);
        }

        // Take the completion hook only once the terminal phase is entered.
        let terminal = self
            .table
            .index_of(&work.phase_name)
            .and_then(|i| self.table.phase_at(i))
            .is_some_and(Phase::is_terminal);
        if terminal {
            let complete = self
                .inner
                .lock()
                .ok()
                .and_then(|mut inner| inner.complete_hook.take());
            info!(
                flow = self.table.flow(),
                phase = work.phase_name,
                "flow complete"
            );
            if let Some(complete) = complete {
                complete();
            }
        }

        if let Some((after, generation)) = work.auto {
            self.schedule_auto(after, generation);
        }
    }

    /// Schedules a delayed automatic transition, keyed to the generation
    /// counter captured at schedule time. The deadline is anchored here,
    /// at phase entry, not at the timer task's first poll.
    fn schedule_auto(self: &Arc<Self>, after: Duration, generation: u64) {
        let engine = Arc::clone(self);
        let cancel = self.cancel.clone();
        let deadline = tokio::time::Instant::now() + after;
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(flow = engine.table.flow(), "auto-advance cancelled");
                }
                () = tokio::time::sleep_until(deadline) => {
                    engine.fire_auto(generation);
                }
            }
        });
    }

    /// Runs a fired timer: a no-op unless the sequencer is still in the
    /// phase that scheduled it (generation match) and not disposed.
    fn fire_auto(self: &Arc<Self>, generation: u64) {
        let work = {
            let Ok(mut inner) = self.lock("auto_advance") else {
                return;
            };
            if inner.generation != generation {
                debug!(
                    flow = self.table.flow(),
                    scheduled = generation,
                    current = inner.generation,
                    "stale auto-advance discarded"
                );
                return;
            }
            let phase = &self.table.phases()[inner.current];
            let Some(auto) = phase.auto() else {
                return;
            };
            info!(
                flow = self.table.flow(),
                from = phase.name(),
                to = self.table.phases()[auto.target].name(),
                "auto-advance"
            );
            let target = auto.target;
            self.transition(&mut inner, target)
        };
        self.run_enter_work(work);
    }
}

impl std::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (current, disposed) = self.inner.lock().map_or((0, true), |inner| {
            (inner.current, inner.disposed)
        });
        f.debug_struct("Sequencer")
            .field("flow", &self.table.flow())
            .field("current", &self.table.phases().get(current).map(Phase::name))
            .field("disposed", &disposed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::table::PhaseTable;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn two_step() -> PhaseTable {
        PhaseTable::builder("test")
            .phase("first")
            .on_event("tap", "second")
            .phase("second")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_starts_at_entry_phase() {
        let seq = Sequencer::create_silent(two_step());
        seq.start().unwrap();
        assert_eq!(seq.current_phase().unwrap(), "first");
        assert!(!seq.is_terminal().unwrap());
    }

    #[tokio::test]
    async fn test_manual_advance() {
        let seq = Sequencer::create_silent(two_step());
        seq.start().unwrap();
        let result = seq.advance("tap").unwrap();
        assert_eq!(
            result,
            Advance::Changed {
                phase: "second".to_string()
            }
        );
        assert_eq!(seq.current_phase().unwrap(), "second");
        assert!(seq.is_terminal().unwrap());
    }

    #[tokio::test]
    async fn test_unknown_event_is_ignored() {
        let seq = Sequencer::create_silent(two_step());
        seq.start().unwrap();
        assert_eq!(seq.advance("swipe").unwrap(), Advance::Unchanged);
        assert_eq!(seq.current_phase().unwrap(), "first");
    }

    #[tokio::test]
    async fn test_advance_bumps_generation() {
        let seq = Sequencer::create_silent(two_step());
        seq.start().unwrap();
        assert_eq!(seq.generation().unwrap(), 0);
        seq.advance("tap").unwrap();
        assert_eq!(seq.generation().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dispose_rejects_calls() {
        let seq = Sequencer::create_silent(two_step());
        seq.start().unwrap();
        seq.dispose();
        assert!(seq.is_disposed());
        assert!(matches!(
            seq.advance("tap"),
            Err(SequencerError::Disposed { .. })
        ));
        assert!(matches!(
            seq.current_phase(),
            Err(SequencerError::Disposed { .. })
        ));
        // Double dispose is a no-op
        seq.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_advance_fires_after_delay() {
        let table = PhaseTable::builder("timed")
            .phase("hold")
            .auto_after(ms(3000), "shown")
            .phase("shown")
            .build()
            .unwrap();
        let seq = Sequencer::create_silent(table);
        seq.start().unwrap();

        tokio::time::advance(ms(2999)).await;
        tokio::task::yield_now().await;
        assert_eq!(seq.current_phase().unwrap(), "hold");

        tokio::time::advance(ms(2)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(seq.current_phase().unwrap(), "shown");
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_deadline_anchored_at_phase_entry() {
        // The clock may move before the timer task is first polled; the
        // delay still counts from phase entry, not from the first poll.
        let table = PhaseTable::builder("anchored")
            .phase("hold")
            .auto_after(ms(1000), "shown")
            .phase("shown")
            .build()
            .unwrap();
        let seq = Sequencer::create_silent(table);
        seq.start().unwrap();

        tokio::time::advance(ms(1000)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(seq.current_phase().unwrap(), "shown");
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_advance_invalidates_pending_timer() {
        // hold auto-advances to "skipped" unless tapped to "tapped" first;
        // the stale timer must not fire after the manual advance.
        let table = PhaseTable::builder("race")
            .phase("hold")
            .auto_after(ms(1000), "tapped")
            .on_event("tap", "tapped")
            .phase("tapped")
            .on_event("next", "after")
            .phase("after")
            .build()
            .unwrap();
        let seq = Sequencer::create_silent(table);
        seq.start().unwrap();

        seq.advance("tap").unwrap();
        assert_eq!(seq.current_phase().unwrap(), "tapped");
        let generation = seq.generation().unwrap();

        tokio::time::advance(ms(1100)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        // Still in "tapped": the timer scheduled in "hold" was stale.
        assert_eq!(seq.current_phase().unwrap(), "tapped");
        assert_eq!(seq.generation().unwrap(), generation);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_pending_timer() {
        let fired = Arc::new(AtomicUsize::new(0));
        let table = PhaseTable::builder("cancel")
            .phase("hold")
            .auto_after(ms(1000), "shown")
            .phase("shown")
            .build()
            .unwrap();
        let seq = Sequencer::create_silent(table);
        let hits = Arc::clone(&fired);
        seq.on_phase_enter(Arc::new(move |_, phase| {
            if phase == "shown" {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        }))
        .unwrap();
        seq.start().unwrap();

        seq.dispose();
        tokio::time::advance(ms(2000)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_fires_at_most_once() {
        let entries = Arc::new(AtomicUsize::new(0));
        let table = PhaseTable::builder("once")
            .phase("hold")
            .auto_after(ms(500), "shown")
            .phase("shown")
            .build()
            .unwrap();
        let seq = Sequencer::create_silent(table);
        let hits = Arc::clone(&entries);
        seq.on_phase_enter(Arc::new(move |_, phase| {
            if phase == "shown" {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        }))
        .unwrap();
        seq.start().unwrap();

        tokio::time::advance(ms(5000)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(entries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_enter_hook_sees_every_phase() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seq = Sequencer::create_silent(two_step());
        let log = Arc::clone(&seen);
        seq.on_phase_enter(Arc::new(move |flow, phase| {
            log.lock().unwrap().push(format!("{flow}/{phase}"));
        }))
        .unwrap();
        seq.start().unwrap();
        seq.advance("tap").unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["test/first".to_string(), "test/second".to_string()]
        );
    }

    #[tokio::test]
    async fn test_completion_fires_exactly_once() {
        let completions = Arc::new(AtomicUsize::new(0));
        let seq = Sequencer::create_silent(two_step());
        let hits = Arc::clone(&completions);
        seq.on_complete(Box::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
        seq.start().unwrap();
        seq.advance("tap").unwrap();
        assert_eq!(completions.load(Ordering::SeqCst), 1);
        // Unknown events after terminal change nothing
        assert_eq!(seq.advance("tap").unwrap(), Advance::Unchanged);
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_completion_on_start_when_entry_is_terminal() {
        let completions = Arc::new(AtomicUsize::new(0));
        let table = PhaseTable::builder("trivial")
            .phase("only")
            .build()
            .unwrap();
        let seq = Sequencer::create_silent(table);
        let hits = Arc::clone(&completions);
        seq.on_complete(Box::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
        seq.start().unwrap();
        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert!(seq.is_terminal().unwrap());
    }

    #[tokio::test]
    async fn test_start_twice_is_noop() {
        let entries = Arc::new(AtomicUsize::new(0));
        let seq = Sequencer::create_silent(two_step());
        let hits = Arc::clone(&entries);
        seq.on_phase_enter(Arc::new(move |_, _| {
            hits.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
        seq.start().unwrap();
        seq.start().unwrap();
        assert_eq!(entries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_entry_effects_run_before_hooks() {
        use crate::effects::{EffectCommand, EffectError, EffectExecutor};

        struct Recorder(Arc<std::sync::Mutex<Vec<String>>>);
        impl EffectExecutor for Recorder {
            fn execute(&self, command: &EffectCommand) -> Result<(), EffectError> {
                self.0.lock().unwrap().push(format!("fx:{}", command.name));
                Ok(())
            }
            fn name(&self) -> &'static str {
                "recorder"
            }
        }

        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let table = PhaseTable::builder("fx")
            .phase("burst")
            .on_enter(EffectCommand::new("chime"))
            .build()
            .unwrap();
        let seq = Sequencer::create(table, Arc::new(Recorder(Arc::clone(&order))));
        let log = Arc::clone(&order);
        seq.on_phase_enter(Arc::new(move |_, phase| {
            log.lock().unwrap().push(format!("hook:{phase}"));
        }))
        .unwrap();
        seq.start().unwrap();
        assert_eq!(
            *order.lock().unwrap(),
            vec!["fx:chime".to_string(), "hook:burst".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failing_executor_does_not_block_flow() {
        use crate::effects::{EffectCommand, EffectError, EffectExecutor};

        struct Broken;
        impl EffectExecutor for Broken {
            fn execute(&self, command: &EffectCommand) -> Result<(), EffectError> {
                Err(EffectError::DispatchFailed {
                    command: command.name.clone(),
                    message: "no backend".to_string(),
                })
            }
            fn name(&self) -> &'static str {
                "broken"
            }
        }

        let table = PhaseTable::builder("fx")
            .phase("a")
            .on_event("tap", "b")
            .phase("b")
            .on_enter(EffectCommand::new("confetti-burst"))
            .build()
            .unwrap();
        let seq = Sequencer::create(table, Arc::new(Broken));
        seq.start().unwrap();
        // The broken executor must not prevent the transition.
        assert_eq!(
            seq.advance("tap").unwrap(),
            Advance::Changed {
                phase: "b".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_debug_output() {
        let seq = Sequencer::create_silent(two_step());
        let debug = format!("{seq:?}");
        assert!(debug.contains("Sequencer"));
        assert!(debug.contains("test"));
    }
}
