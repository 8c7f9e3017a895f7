//! Experience configuration schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scenes::bottle::BottleTimings;
use crate::scenes::chapter::ChapterTimings;
use crate::scenes::finale::FinaleKind;
use crate::scenes::intro::IntroTimings;
use crate::scenes::quiz::{self, Question, QuizTimings};

use super::Span;

/// Fallback countdown when neither `target` nor `duration` is set:
/// five seconds from launch, handy when rehearsing the flow.
pub const REHEARSAL_COUNTDOWN: Span = Span::from_millis(5000);

/// Top-level configuration for a full experience run.
///
/// Every field has a default, so an empty file (or no file at all)
/// yields the stock choreography.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperienceConfig {
    pub countdown: CountdownConfig,
    pub intro: IntroTimings,
    pub chapter: ChapterTimings,
    pub bottle: BottleTimings,
    pub quiz: QuizConfig,
    /// Which finale the main page mounts.
    pub finale: FinaleKind,
}

impl ExperienceConfig {
    /// Returns a copy with every timing divided by `factor`, for
    /// accelerated playback. The absolute countdown `target` is left
    /// alone; only relative spans shrink.
    #[must_use]
    pub fn accelerated(&self, factor: f64) -> Self {
        let mut config = self.clone();
        config.countdown.duration = config.countdown.duration.map(|s| s.scaled(factor));
        config.countdown.tick = config.countdown.tick.map(|s| s.scaled(factor));
        config.intro.greet_hold = config.intro.greet_hold.scaled(factor);
        for hold in &mut config.intro.message_holds {
            *hold = hold.scaled(factor);
        }
        config.chapter.line_hold = config.chapter.line_hold.scaled(factor);
        config.chapter.pre_roll_pause = config.chapter.pre_roll_pause.scaled(factor);
        config.chapter.roll_settle = config.chapter.roll_settle.scaled(factor);
        config.bottle.cork_pop = config.bottle.cork_pop.scaled(factor);
        config.bottle.confetti_delay = config.bottle.confetti_delay.scaled(factor);
        config.quiz.timings.feedback_hold = config.quiz.timings.feedback_hold.scaled(factor);
        config
    }
}

/// When the countdown unlocks.
///
/// `target` and `duration` are mutually exclusive; with neither, the
/// rehearsal default applies.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CountdownConfig {
    /// Absolute unlock instant (RFC 3339).
    pub target: Option<DateTime<Utc>>,
    /// Unlock this long after launch.
    pub duration: Option<Span>,
    /// Wall-clock poll interval.
    pub tick: Option<Span>,
}

impl CountdownConfig {
    /// Resolves the unlock instant relative to `now`. Durations too large
    /// to represent saturate at the calendar's far end.
    #[must_use]
    pub fn target_instant(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if let Some(target) = self.target {
            return target;
        }
        let span = self.duration.unwrap_or(REHEARSAL_COUNTDOWN);
        let delta =
            chrono::TimeDelta::milliseconds(i64::try_from(span.as_millis()).unwrap_or(i64::MAX));
        now.checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Quiz timings and question set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuizConfig {
    pub timings: QuizTimings,
    pub questions: Vec<Question>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            timings: QuizTimings::default(),
            questions: quiz::default_questions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: ExperienceConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.finale, FinaleKind::Bottle);
        assert_eq!(config.quiz.questions.len(), 5);
        assert!(config.countdown.target.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_yaml::from_str::<ExperienceConfig>("surprises: true").is_err());
    }

    #[test]
    fn test_countdown_target_instant_priority() {
        let now = Utc::now();
        let explicit = now + TimeDelta::days(3);
        let config = CountdownConfig {
            target: Some(explicit),
            duration: Some(Span::from_millis(1000)),
            tick: None,
        };
        assert_eq!(config.target_instant(now), explicit);

        let config = CountdownConfig {
            target: None,
            duration: Some(Span::from_millis(60_000)),
            tick: None,
        };
        assert_eq!(config.target_instant(now), now + TimeDelta::minutes(1));

        let config = CountdownConfig::default();
        assert_eq!(config.target_instant(now), now + TimeDelta::seconds(5));
    }

    #[test]
    fn test_countdown_target_instant_saturates_on_huge_duration() {
        let config = CountdownConfig {
            target: None,
            duration: Some(Span::from_millis(u64::MAX)),
            tick: None,
        };
        assert_eq!(config.target_instant(Utc::now()), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_accelerated_scales_relative_spans_only() {
        let mut config = ExperienceConfig::default();
        config.countdown.target = Some(Utc::now() + TimeDelta::days(1));
        config.countdown.duration = Some(Span::from_millis(10_000));
        let fast = config.accelerated(10.0);
        assert_eq!(fast.countdown.target, config.countdown.target);
        assert_eq!(fast.countdown.duration, Some(Span::from_millis(1000)));
        assert_eq!(fast.intro.greet_hold, Span::from_millis(300));
        assert_eq!(fast.chapter.roll_settle, Span::from_millis(450));
        assert_eq!(fast.quiz.timings.feedback_hold, Span::from_millis(150));
    }

    #[test]
    fn test_full_config_parses() {
        let yaml = r#"
countdown:
  duration: "1h"
  tick: 500
intro:
  greet_hold: "3s"
  message_holds: [2500, 2500, "3s"]
chapter:
  line_hold: 2000
  pre_roll_pause: 1000
  roll_settle: "4s 500ms"
bottle:
  cork_pop: 1500
  confetti_delay: 800
quiz:
  timings:
    feedback_hold: 1500
finale: surprise
"#;
        let config: ExperienceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.finale, FinaleKind::Surprise);
        assert_eq!(config.countdown.duration, Some(Span::from_millis(3_600_000)));
        assert_eq!(config.intro.message_holds.len(), 3);
        assert_eq!(config.chapter.roll_settle, Span::from_millis(4500));
    }
}
