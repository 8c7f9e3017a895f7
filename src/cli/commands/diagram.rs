//! The `diagram` command: Mermaid state diagrams for every flow.

use crate::cli::args::DiagramArgs;
use crate::config::{ConfigLoader, ExperienceConfig};
use crate::diagram;
use crate::error::{ConfigError, StagecueError};
use crate::scenes;
use crate::sequencer::PhaseTable;

/// Renders the configured flows as `stateDiagram-v2` blocks.
pub fn run(args: &DiagramArgs) -> Result<(), StagecueError> {
    let loader = ConfigLoader::with_defaults();
    let loaded = match &args.config {
        Some(path) => loader.load(path)?,
        None => loader.freeze(ExperienceConfig::default(), None)?,
    };
    let config = loaded.config;

    let finale = scenes::finale::select(config.finale, config.bottle);
    let tables: Vec<PhaseTable> = vec![
        scenes::app::table()?,
        scenes::countdown::table()?,
        scenes::intro::table(&config.intro)?,
        scenes::chapter::table(&config.chapter)?,
        finale.table()?,
    ];

    let selected: Vec<&PhaseTable> = match &args.flow {
        Some(flow) => {
            let found: Vec<&PhaseTable> = tables.iter().filter(|t| t.flow() == flow).collect();
            if found.is_empty() {
                let known: Vec<&str> = tables.iter().map(PhaseTable::flow).collect();
                return Err(ConfigError::InvalidValue {
                    field: "--flow".to_string(),
                    value: flow.clone(),
                    expected: format!("one of: {}", known.join(", ")),
                }
                .into());
            }
            found
        }
        None => tables.iter().collect(),
    };

    for (i, table) in selected.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("%% flow: {}", table.flow());
        println!("{}", diagram::render(table));
    }
    Ok(())
}
