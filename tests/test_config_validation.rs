//! Configuration loading against on-disk fixtures.

mod common;

use common::fixture_path;
use stagecue::config::ConfigLoader;
use stagecue::error::ConfigError;
use stagecue::scenes::finale::FinaleKind;

#[test]
fn party_fixture_loads_clean() {
    let result = ConfigLoader::with_defaults()
        .load(&fixture_path("party.yaml"))
        .unwrap();
    let config = &result.config;
    assert_eq!(config.finale, FinaleKind::Surprise);
    assert_eq!(config.quiz.questions.len(), 2);
    assert_eq!(config.quiz.questions[1].answer, 0);
    // Two custom questions instead of the stock three-message count:
    // holds still match the built-in messages, so no warnings.
    assert!(result.warnings.is_empty());
}

#[test]
fn invalid_fixture_reports_every_error() {
    let err = ConfigLoader::with_defaults()
        .load(&fixture_path("invalid.yaml"))
        .unwrap_err();
    let ConfigError::ValidationError { errors, .. } = err else {
        panic!("expected validation failure, got {err}");
    };
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    // target+duration conflict, answer out of range, blank prompt,
    // too few options: all reported in one pass.
    assert_eq!(errors.len(), 4, "{messages:?}");
    assert!(messages.iter().any(|m| m.contains("mutually exclusive")));
    assert!(messages.iter().any(|m| m.contains("out of range")));
    assert!(messages.iter().any(|m| m.contains("prompt")));
    assert!(messages.iter().any(|m| m.contains("two options")));
}

#[test]
fn rehearsal_fixture_builds_all_tables() {
    let result = ConfigLoader::with_defaults()
        .load(&fixture_path("rehearsal.yaml"))
        .unwrap();
    let config = &result.config;

    stagecue::scenes::app::table().unwrap();
    stagecue::scenes::countdown::table().unwrap();
    stagecue::scenes::intro::table(&config.intro).unwrap();
    stagecue::scenes::chapter::table(&config.chapter).unwrap();
    stagecue::scenes::finale::select(config.finale, config.bottle)
        .table()
        .unwrap();
}

#[test]
fn mixed_duration_forms_agree() {
    let result = ConfigLoader::with_defaults()
        .load(&fixture_path("party.yaml"))
        .unwrap();
    let config = &result.config;
    // "4s 500ms" and 4500 describe the same settle.
    assert_eq!(config.chapter.roll_settle.as_millis(), 4500);
    assert_eq!(config.intro.message_holds[2].as_millis(), 3000);
    assert_eq!(config.countdown.duration.unwrap().as_millis(), 1000);
}
