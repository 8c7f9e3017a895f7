//! CLI argument definitions.
//!
//! All Clap derive structs for `stagecue` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Timeline sequencer for staged interactive experiences.
#[derive(Parser, Debug)]
#[command(name = "stagecue", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "STAGECUE_COLOR")]
    pub color: ColorChoice,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play the experience end to end in the terminal.
    Run(RunArgs),

    /// Validate a configuration file without running.
    Validate(ValidateArgs),

    /// Render the configured flows as Mermaid state diagrams.
    Diagram(DiagramArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to YAML configuration file. Defaults apply without one.
    #[arg(short, long, env = "STAGECUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reaction pause before each simulated tap.
    #[arg(long, default_value = "750ms", value_parser = humantime::parse_duration)]
    pub tap_delay: std::time::Duration,

    /// Playback speed multiplier; every timing is divided by this.
    #[arg(long, default_value_t = 1.0, value_parser = parse_speed)]
    pub speed: f64,

    /// Log effect commands instead of discarding them.
    #[arg(long)]
    pub trace_effects: bool,
}

fn parse_speed(value: &str) -> Result<f64, String> {
    let factor: f64 = value
        .parse()
        .map_err(|e| format!("invalid speed factor: {e}"))?;
    if factor.is_finite() && factor > 0.0 {
        Ok(factor)
    } else {
        Err("speed must be a positive number".to_string())
    }
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to check.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,

    /// Output format.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `diagram`.
#[derive(Args, Debug)]
pub struct DiagramArgs {
    /// Path to YAML configuration file. Defaults apply without one.
    #[arg(short, long, env = "STAGECUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Render only the named flow (app, countdown, intro, chapter,
    /// or the finale).
    #[arg(long)]
    pub flow: Option<String>,
}

/// Arguments for `version`.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

/// Color output control.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Colors when stderr is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

/// Output format for informational commands.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Human,
    /// Machine-readable JSON.
    Json,
}
