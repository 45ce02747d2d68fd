use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use grid_snake::game::GameConfig;
use grid_snake::logging;
use grid_snake::modes::HumanMode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Snake game for the terminal")]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// Simulation ticks per second
    #[arg(long)]
    tps: Option<u32>,

    /// Append logs to this file (filter with RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_file(path)?,
            None => GameConfig::default(),
        };

        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(tps) = self.tps {
            config.ticks_per_second = tps;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref())?;

    let config = cli.game_config()?;
    info!(?config, "starting");

    let mut human_mode = HumanMode::new(config);
    if let Err(err) = human_mode.run().await {
        error!(?err, "game aborted");
        return Err(err);
    }

    Ok(())
}
