//! Semantic validation for experience configurations.
//!
//! Validation runs on the fully deserialized config and collects ALL
//! issues rather than stopping at the first, so a config author sees
//! everything wrong in one pass.

use chrono::Utc;

use crate::error::{Severity, ValidationIssue};
use crate::scenes::intro;

use super::loader::ConfigLimits;
use super::schema::ExperienceConfig;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Errors prevent the experience from running.
    pub errors: Vec<ValidationIssue>,
    /// Warnings are informational.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration, collecting every issue found.
    pub fn validate(
        &mut self,
        config: &ExperienceConfig,
        limits: &ConfigLimits,
    ) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_countdown(config);
        self.validate_intro(config, limits);
        self.validate_chapter(config);
        self.validate_quiz(config, limits);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_countdown(&mut self, config: &ExperienceConfig) {
        let cd = &config.countdown;
        if cd.target.is_some() && cd.duration.is_some() {
            self.add_error(
                "countdown",
                "target and duration are mutually exclusive; set only one",
            );
        }
        if cd.target.is_none() && cd.duration.is_none() {
            self.add_warning(
                "countdown",
                "no target or duration set; using the 5s rehearsal countdown",
            );
        }
        if let Some(target) = cd.target {
            if target < Utc::now() {
                self.add_warning(
                    "countdown.target",
                    "target is in the past; the countdown will expire immediately",
                );
            }
        }
        if let Some(tick) = cd.tick {
            if tick.is_zero() {
                self.add_error("countdown.tick", "tick must be greater than zero");
            }
        }
    }

    fn validate_intro(&mut self, config: &ExperienceConfig, limits: &ConfigLimits) {
        let holds = &config.intro.message_holds;
        if holds.len() > limits.max_message_holds {
            self.add_error(
                "intro.message_holds",
                &format!(
                    "{} holds exceeds the maximum of {}",
                    holds.len(),
                    limits.max_message_holds
                ),
            );
        }
        if holds.len() != intro::MESSAGES.len() {
            self.add_warning(
                "intro.message_holds",
                &format!(
                    "{} holds but {} messages; extra phases show no text",
                    holds.len(),
                    intro::MESSAGES.len()
                ),
            );
        }
        for (i, hold) in holds.iter().enumerate() {
            if hold.is_zero() {
                self.add_warning(
                    &format!("intro.message_holds[{i}]"),
                    "zero hold; the message will not be readable",
                );
            }
        }
        if config.intro.greet_hold.is_zero() {
            self.add_warning("intro.greet_hold", "zero hold; the greeting is skipped");
        }
    }

    fn validate_chapter(&mut self, config: &ExperienceConfig) {
        if config.chapter.roll_settle.is_zero() {
            self.add_warning("chapter.roll_settle", "zero settle; the roll is skipped");
        }
    }

    fn validate_quiz(&mut self, config: &ExperienceConfig, limits: &ConfigLimits) {
        let questions = &config.quiz.questions;
        if questions.is_empty() {
            self.add_error("quiz.questions", "at least one question is required");
        }
        if questions.len() > limits.max_questions {
            self.add_error(
                "quiz.questions",
                &format!(
                    "{} questions exceeds the maximum of {}",
                    questions.len(),
                    limits.max_questions
                ),
            );
        }
        for (i, q) in questions.iter().enumerate() {
            let path = format!("quiz.questions[{i}]");
            if q.options.len() < 2 {
                self.add_error(&path, "a question needs at least two options");
            }
            if q.answer >= q.options.len() {
                self.add_error(
                    &path,
                    &format!(
                        "answer index {} out of range for {} options",
                        q.answer,
                        q.options.len()
                    ),
                );
            }
            if q.prompt.trim().is_empty() {
                self.add_error(&path, "prompt must not be empty");
            }
        }
    }

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}
