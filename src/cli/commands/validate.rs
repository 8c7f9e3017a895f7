//! The `validate` command: checks configurations without running.

use std::path::Path;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::ConfigLoader;
use crate::error::{ConfigError, Severity, StagecueError, ValidationIssue};

/// Validates each configuration file and reports every issue found.
///
/// With `--strict`, a file that loads with warnings still counts as
/// invalid. The first failing file's error is returned after all
/// files have been reported.
pub fn run(args: &ValidateArgs) -> Result<(), StagecueError> {
    let loader = ConfigLoader::with_defaults();
    let mut first_failure: Option<StagecueError> = None;

    for path in &args.files {
        let outcome = check_one(&loader, path, args);
        if let Err(e) = outcome {
            first_failure.get_or_insert(e);
        }
    }

    match first_failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn check_one(
    loader: &ConfigLoader,
    path: &Path,
    args: &ValidateArgs,
) -> Result<(), StagecueError> {
    match loader.load(path) {
        Ok(result) => {
            if args.strict && !result.warnings.is_empty() {
                let errors: Vec<ValidationIssue> = result
                    .warnings
                    .iter()
                    .map(|w| ValidationIssue {
                        path: w.location.clone().unwrap_or_else(|| "config".to_string()),
                        message: w.message.clone(),
                        severity: Severity::Warning,
                    })
                    .collect();
                report_invalid(path, &errors, args.format);
                return Err(StagecueError::Config(ConfigError::ValidationError {
                    path: path.to_path_buf(),
                    errors,
                }));
            }
            match args.format {
                OutputFormat::Human => {
                    println!("{}: OK", path.display());
                    for warning in &result.warnings {
                        println!(
                            "  warning ({}): {}",
                            warning.location.as_deref().unwrap_or("config"),
                            warning.message
                        );
                    }
                }
                OutputFormat::Json => {
                    let warnings: Vec<serde_json::Value> = result
                        .warnings
                        .iter()
                        .map(|w| {
                            serde_json::json!({
                                "location": w.location,
                                "message": w.message,
                            })
                        })
                        .collect();
                    println!(
                        "{}",
                        serde_json::json!({
                            "path": path.display().to_string(),
                            "valid": true,
                            "warnings": warnings,
                        })
                    );
                }
            }
            Ok(())
        }
        Err(ConfigError::ValidationError { path, errors }) => {
            report_invalid(&path, &errors, args.format);
            Err(StagecueError::Config(ConfigError::ValidationError {
                path,
                errors,
            }))
        }
        Err(e) => Err(e.into()),
    }
}

fn report_invalid(path: &Path, errors: &[ValidationIssue], format: OutputFormat) {
    match format {
        OutputFormat::Human => {
            println!("{}: INVALID", path.display());
            for error in errors {
                println!("  {error}");
            }
        }
        OutputFormat::Json => {
            let issues: Vec<serde_json::Value> = errors
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "location": e.path,
                        "message": e.message,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::json!({
                    "path": path.display().to_string(),
                    "valid": false,
                    "errors": issues,
                })
            );
        }
    }
}
