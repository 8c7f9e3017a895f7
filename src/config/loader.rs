//! Configuration loading pipeline: size check, YAML parse, semantic
//! validation, freeze with `Arc`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::error::ConfigError;

use super::schema::ExperienceConfig;
use super::validation::Validator;

/// Options for the configuration loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    pub limits: ConfigLimits,
}

/// Limits guarding against runaway configurations.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum configuration file size in bytes.
    pub max_config_size: usize,
    /// Maximum quiz questions.
    pub max_questions: usize,
    /// Maximum intro message holds.
    pub max_message_holds: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or("STAGECUE_MAX_CONFIG_SIZE", 1024 * 1024),
            max_questions: env_or("STAGECUE_MAX_QUESTIONS", 100),
            max_message_holds: env_or("STAGECUE_MAX_MESSAGE_HOLDS", 50),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<ExperienceConfig>,
    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    pub message: String,
    pub location: Option<String>,
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    #[must_use]
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or oversized, YAML
    /// parsing fails, or validation reports errors.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > self.options.limits.max_config_size {
            return Err(ConfigError::TooLarge {
                size: file_size,
                limit: self.options.limits.max_config_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

        // An empty file is a valid "all defaults" config.
        let config: ExperienceConfig = if raw.trim().is_empty() {
            ExperienceConfig::default()
        } else {
            serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        self.freeze(config, Some(path))
    }

    /// Validates and freezes an already-built configuration, as used
    /// when no config file is given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if validation reports
    /// errors.
    pub fn freeze(
        &self,
        config: ExperienceConfig,
        path: Option<&Path>,
    ) -> Result<LoadResult, ConfigError> {
        let result = Validator::new().validate(&config, &self.options.limits);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.map_or_else(|| PathBuf::from("<defaults>"), Path::to_path_buf),
                errors: result.errors,
            });
        }
        let warnings = result
            .warnings
            .into_iter()
            .map(|issue| LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            })
            .collect::<Vec<_>>();
        for warning in &warnings {
            warn!(
                location = warning.location.as_deref().unwrap_or("<config>"),
                "{}", warning.message
            );
        }
        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
