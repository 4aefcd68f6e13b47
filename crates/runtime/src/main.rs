//! Headless tower simulation entry point.
//!
//! Usage: `tower-sim [scenario]` (default `demo`). The data directory is read
//! from `TOWER_DATA_DIR`, falling back to the bundled content.

use std::path::PathBuf;

use anyhow::Result;
use tower_content::ContentFactory;
use tower_runtime::{RuntimeBuilder, Scenario};

const BUNDLED_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../game/content/data");

struct SimConfig {
    data_dir: PathBuf,
    scenario: String,
}

impl SimConfig {
    fn from_env() -> Self {
        let data_dir = std::env::var_os("TOWER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(BUNDLED_DATA_DIR));
        let scenario = std::env::args().nth(1).unwrap_or_else(|| "demo".to_string());
        Self { data_dir, scenario }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SimConfig::from_env();
    let factory = ContentFactory::new(config.data_dir.clone());
    let scenario = Scenario::load_from_file(&factory.scenario_path(&config.scenario))?;

    let mut runtime = RuntimeBuilder::from_content(&factory)?.build()?;
    let outcome = scenario.run(&mut runtime)?;

    for (name, damage) in &outcome.damage {
        tracing::info!(enemy = %name, damage, "damage dealt");
    }
    tracing::info!(now = %runtime.now(), "scenario finished");
    Ok(())
}
