//! The `run` command: plays the experience in the terminal.

use std::sync::Arc;

use tracing::info;

use crate::cli::args::RunArgs;
use crate::config::{ConfigLoader, ExperienceConfig};
use crate::effects::{EffectExecutor, NullExecutor, TracingExecutor};
use crate::error::StagecueError;
use crate::experience::{AutoTap, ConsoleRenderer, Experience};

/// Loads the configuration (stock defaults without a file) and plays
/// the whole choreography.
pub async fn run(args: &RunArgs) -> Result<(), StagecueError> {
    let loader = ConfigLoader::with_defaults();
    let loaded = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            loader.load(path)?
        }
        None => loader.freeze(ExperienceConfig::default(), None)?,
    };

    let config = if (args.speed - 1.0).abs() > f64::EPSILON {
        info!(speed = args.speed, "accelerated playback");
        Arc::new(loaded.config.accelerated(args.speed))
    } else {
        loaded.config
    };

    let executor: Arc<dyn EffectExecutor> = if args.trace_effects {
        Arc::new(TracingExecutor)
    } else {
        Arc::new(NullExecutor)
    };

    let tap_delay = args.tap_delay.div_f64(args.speed);
    let experience = Experience::new(config, executor, Arc::new(ConsoleRenderer))
        .with_auto_tap(AutoTap::new(tap_delay));
    experience.run().await
}
