//! Full experience orchestration.
//!
//! The outer `app` flow mounts one nested scene at a time: the
//! countdown, the intro, the chapter, then the main page with the quiz
//! and the configured finale. Each nested sequencer's completion
//! advances the outer flow; a headless run simulates the audience's
//! taps so the whole choreography plays end to end.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::config::ExperienceConfig;
use crate::effects::EffectExecutor;
use crate::error::{Result, SequencerError};
use crate::scenes::countdown::CountdownClock;
use crate::scenes::quiz::{Answer, Progress, Quiz};
use crate::scenes::{self, COMPLETE, DEADLINE};
use crate::sequencer::{PhaseTable, Sequencer};

/// Receives what each phase puts on screen.
pub trait SceneRenderer: Send + Sync {
    /// A flow entered a phase.
    fn phase_entered(&self, flow: &str, phase: &str);

    /// Free-form text: countdown readouts, quiz prompts, results.
    fn line(&self, text: &str);
}

/// Renders to stdout, resolving phases to their on-screen text.
#[derive(Debug, Default)]
pub struct ConsoleRenderer;

impl ConsoleRenderer {
    fn content_for(flow: &str, phase: &str) -> Option<String> {
        match flow {
            "intro" => match phase {
                scenes::intro::GREET => Some("Hey, it's your day".to_string()),
                _ => phase
                    .strip_prefix("message-")
                    .and_then(|n| n.parse::<usize>().ok())
                    .and_then(|n| scenes::intro::MESSAGES.get(n - 1))
                    .map(|m| (*m).to_string()),
            },
            "chapter" => phase
                .strip_prefix("line-")
                .and_then(|n| n.parse::<usize>().ok())
                .and_then(|n| scenes::chapter::POETIC_LINES.get(n - 1))
                .map(|l| (*l).to_string()),
            _ => None,
        }
    }
}

impl SceneRenderer for ConsoleRenderer {
    fn phase_entered(&self, flow: &str, phase: &str) {
        if let Some(content) = Self::content_for(flow, phase) {
            println!("  {content}");
        } else {
            println!("[{flow}] {phase}");
        }
    }

    fn line(&self, text: &str) {
        println!("  {text}");
    }
}

/// Discards everything. Useful in tests.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl SceneRenderer for NullRenderer {
    fn phase_entered(&self, _flow: &str, _phase: &str) {}
    fn line(&self, _text: &str) {}
}

/// Simulates the audience for headless runs: whenever a phase waits on
/// a manual event, fires that event after a short reaction pause. The
/// countdown's `deadline` stays with the clock.
#[derive(Debug, Clone, Copy)]
pub struct AutoTap {
    delay: Duration,
}

impl Default for AutoTap {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(750),
        }
    }
}

impl AutoTap {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Attaches the driver to a sequencer. Holds only a weak handle so
    /// disposal is not kept alive by pending taps.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Disposed`] if the sequencer is already
    /// disposed.
    pub fn attach(&self, sequencer: &Arc<Sequencer>) -> std::result::Result<(), SequencerError> {
        let delay = self.delay;
        let weak = Arc::downgrade(sequencer);
        sequencer.on_phase_enter(Arc::new(move |_, phase| {
            let Some(seq) = weak.upgrade() else {
                return;
            };
            let Some(index) = seq.table().index_of(phase) else {
                return;
            };
            let entered = &seq.table().phases()[index];
            if entered.auto().is_some() || entered.is_terminal() {
                return;
            }
            let Some(event) = entered
                .transitions()
                .keys()
                .find(|e| e.as_str() != DEADLINE)
                .cloned()
            else {
                return;
            };
            let weak = Arc::downgrade(&seq);
            drop(seq);
            // Anchor the tap deadline at phase entry, not at the task's
            // first poll.
            let deadline = tokio::time::Instant::now() + delay;
            tokio::spawn(async move {
                tokio::time::sleep_until(deadline).await;
                if let Some(seq) = weak.upgrade() {
                    debug!(event, "auto-tap");
                    // Ignored events and disposal are both fine here.
                    let _ = seq.advance(&event);
                }
            });
        }))
    }
}

/// Runs the configured experience end to end.
pub struct Experience {
    config: Arc<ExperienceConfig>,
    executor: Arc<dyn EffectExecutor>,
    renderer: Arc<dyn SceneRenderer>,
    auto_tap: AutoTap,
}

impl Experience {
    #[must_use]
    pub fn new(
        config: Arc<ExperienceConfig>,
        executor: Arc<dyn EffectExecutor>,
        renderer: Arc<dyn SceneRenderer>,
    ) -> Self {
        Self {
            config,
            executor,
            renderer,
            auto_tap: AutoTap::default(),
        }
    }

    #[must_use]
    pub fn with_auto_tap(mut self, auto_tap: AutoTap) -> Self {
        self.auto_tap = auto_tap;
        self
    }

    /// Plays the whole experience: countdown, intro, chapter, then the
    /// main page with the quiz and the finale.
    ///
    /// # Errors
    ///
    /// Propagates sequencer failures; effect failures never surface
    /// here.
    pub async fn run(&self) -> Result<()> {
        let app = Sequencer::create(scenes::app::table()?, Arc::clone(&self.executor));
        self.attach_renderer(&app)?;
        app.start()?;

        self.run_countdown(&app).await?;
        self.run_stage(&app, scenes::intro::table(&self.config.intro)?)
            .await?;
        self.run_stage(&app, scenes::chapter::table(&self.config.chapter)?)
            .await?;
        self.run_main().await?;

        app.dispose();
        info!("experience finished");
        Ok(())
    }

    async fn run_countdown(&self, app: &Arc<Sequencer>) -> Result<()> {
        let sequencer = self.mount(scenes::countdown::table()?)?;
        let completed = self.completion_of(&sequencer)?;
        sequencer.start()?;

        let target = self.config.countdown.target_instant(Utc::now());
        let mut clock = CountdownClock::new(target);
        if let Some(tick) = self.config.countdown.tick {
            clock = clock.with_tick(tick.into());
        }
        self.renderer
            .line(&format!("Until the big day: {}", clock.time_left()));

        clock.run(&sequencer).await?;
        // The auto-tap opens the gift once the countdown expires.
        completed.await.ok();
        sequencer.dispose();
        app.advance(COMPLETE)?;
        Ok(())
    }

    async fn run_stage(&self, app: &Arc<Sequencer>, table: PhaseTable) -> Result<()> {
        let sequencer = self.mount(table)?;
        let completed = self.completion_of(&sequencer)?;
        sequencer.start()?;
        completed.await.ok();
        sequencer.dispose();
        app.advance(COMPLETE)?;
        Ok(())
    }

    async fn run_main(&self) -> Result<()> {
        self.play_quiz().await;

        let finale = scenes::finale::select(self.config.finale, self.config.bottle);
        info!(finale = finale.name(), "mounting finale");
        let sequencer = self.mount(finale.table()?)?;
        let completed = self.completion_of(&sequencer)?;
        sequencer.start()?;
        completed.await.ok();
        sequencer.dispose();
        Ok(())
    }

    /// Plays the quiz as its author would: every answer right.
    async fn play_quiz(&self) {
        let mut quiz = Quiz::new(self.config.quiz.questions.clone());
        let hold = Duration::from(self.config.quiz.timings.feedback_hold);
        while let Some(question) = quiz.current_question() {
            let answer = question.answer;
            let option = question.options.get(answer).cloned();
            self.renderer.line(&format!(
                "Q{}/{}: {}",
                quiz.question_number(),
                quiz.total(),
                question.prompt
            ));
            if quiz.select(answer) == Answer::Correct {
                if let Some(option) = option {
                    self.renderer.line(&format!("✓ {option}"));
                }
            }
            tokio::time::sleep(hold).await;
            if quiz.advance() == Progress::Ignored {
                // An unvalidated question can carry an out-of-range
                // answer; nothing locks in, so bail instead of spinning.
                debug!(question = quiz.question_number(), "unanswerable question; quiz abandoned");
                break;
            }
        }
        self.renderer
            .line(&format!("{}/{} — {}", quiz.score(), quiz.total(), quiz.result_message()));
    }

    fn mount(&self, table: PhaseTable) -> Result<Arc<Sequencer>> {
        let sequencer = Sequencer::create(table, Arc::clone(&self.executor));
        self.attach_renderer(&sequencer)?;
        self.auto_tap.attach(&sequencer)?;
        Ok(sequencer)
    }

    fn attach_renderer(&self, sequencer: &Arc<Sequencer>) -> Result<()> {
        let renderer = Arc::clone(&self.renderer);
        sequencer.on_phase_enter(Arc::new(move |flow, phase| {
            renderer.phase_entered(flow, phase);
        }))?;
        Ok(())
    }

    fn completion_of(&self, sequencer: &Arc<Sequencer>) -> Result<oneshot::Receiver<()>> {
        let (tx, rx) = oneshot::channel();
        sequencer.on_complete(Box::new(move || {
            let _ = tx.send(());
        }))?;
        Ok(rx)
    }
}
