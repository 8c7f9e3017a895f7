//! "How well do you know me?" quiz.
//!
//! A small synchronous model: one question at a time, an answer locks
//! in and is graded, then the quiz advances after the feedback hold.
//! Like the sequencer, out-of-place inputs are ignored rather than
//! errors.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Span;

/// Feedback hold before the next question appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuizTimings {
    pub feedback_hold: Span,
}

impl Default for QuizTimings {
    fn default() -> Self {
        Self {
            feedback_hold: Span::from_millis(1500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub answer: usize,
}

/// Outcome of selecting an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Correct,
    Incorrect {
        /// Index of the option that was right.
        correct: usize,
    },
    /// Selection ignored: already answered, quiz finished, or index
    /// out of range.
    Ignored,
}

/// Outcome of moving past a graded question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    NextQuestion,
    Finished,
    /// Nothing to advance past.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Quiz {
    questions: Vec<Question>,
    current: usize,
    score: usize,
    selected: Option<usize>,
    finished: bool,
}

impl Quiz {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            current: 0,
            score: 0,
            selected: None,
            finished: false,
        }
    }

    #[must_use]
    pub fn with_default_questions() -> Self {
        Self::new(default_questions())
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.finished {
            None
        } else {
            self.questions.get(self.current)
        }
    }

    /// 1-based number of the question on screen.
    #[must_use]
    pub const fn question_number(&self) -> usize {
        self.current + 1
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Grades an option for the current question. The first selection
    /// locks in; anything after it (or out of range) is ignored.
    pub fn select(&mut self, index: usize) -> Answer {
        if self.finished || self.selected.is_some() {
            return Answer::Ignored;
        }
        let Some(question) = self.questions.get(self.current) else {
            return Answer::Ignored;
        };
        if index >= question.options.len() {
            debug!(index, options = question.options.len(), "option out of range; ignored");
            return Answer::Ignored;
        }
        self.selected = Some(index);
        if index == question.answer {
            self.score += 1;
            Answer::Correct
        } else {
            Answer::Incorrect {
                correct: question.answer,
            }
        }
    }

    /// Moves past a graded question, once its feedback hold has been
    /// shown. Ignored unless an option is locked in.
    pub fn advance(&mut self) -> Progress {
        if self.finished || self.selected.is_none() {
            return Progress::Ignored;
        }
        self.selected = None;
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            Progress::NextQuestion
        } else {
            self.finished = true;
            Progress::Finished
        }
    }

    /// Back to question one with a clean score.
    pub fn restart(&mut self) {
        self.current = 0;
        self.score = 0;
        self.selected = None;
        self.finished = false;
    }

    /// Result tier for the final score.
    #[must_use]
    pub fn result_message(&self) -> &'static str {
        if self.score == self.questions.len() {
            "Soulmate Level! 💕 You know me perfectly."
        } else if self.score + 2 >= self.questions.len() {
            "Almost Telepathic! 🌟 We're so in sync."
        } else {
            "Room to Grow! 🌱 Let's make more memories."
        }
    }
}

/// The stock question set.
#[must_use]
pub fn default_questions() -> Vec<Question> {
    let q = |prompt: &str, options: [&str; 4], answer: usize| Question {
        prompt: prompt.to_string(),
        options: options.iter().map(ToString::to_string).collect(),
        answer,
    };
    vec![
        q(
            "What's my favorite thing about you?",
            ["Your laugh", "Your kindness", "Your cooking", "Your style"],
            1,
        ),
        q(
            "What makes me feel better instantly?",
            ["Your text", "Music", "Snacks", "Your voice"],
            3,
        ),
        q(
            "What's my favorite thing to do with you?",
            [
                "Watch movies in discord",
                "Eat together",
                "Just talk",
                "Walk around",
            ],
            0,
        ),
        q(
            "If I could teleport anywhere with you right now?",
            ["Paris", "Bali", "Japan", "Switzerland"],
            2,
        ),
        q(
            "What am I thinking about right now?",
            ["Food", "Sleep", "Work", "You! ❤️"],
            3,
        ),
    ]
}
