//! Configuration: schema, loading, validation.

pub mod loader;
pub mod schema;
mod span;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::{CountdownConfig, ExperienceConfig, QuizConfig};
pub use span::Span;
pub use validation::{ValidationResult, Validator};
