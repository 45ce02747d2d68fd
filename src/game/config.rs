use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Largest accepted grid side, in cells
pub const MAX_GRID_SIDE: usize = 1000;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Simulation rate while playing
    pub ticks_per_second: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 30,
            grid_height: 20,
            initial_snake_length: 3,
            ticks_per_second: 10,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Load a configuration from a JSON file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Reject grids that cannot hold the starting snake plus one food cell
    pub fn validate(&self) -> Result<()> {
        ensure!(self.ticks_per_second > 0, "ticks_per_second must be positive");
        ensure!(
            self.initial_snake_length >= 1,
            "initial_snake_length must be at least 1"
        );
        ensure!(
            self.grid_width >= 1 && self.grid_height >= 1,
            "grid must be at least 1x1, got {}x{}",
            self.grid_width,
            self.grid_height
        );
        ensure!(
            self.grid_width <= MAX_GRID_SIDE && self.grid_height <= MAX_GRID_SIDE,
            "grid must be at most {}x{}, got {}x{}",
            MAX_GRID_SIDE,
            MAX_GRID_SIDE,
            self.grid_width,
            self.grid_height
        );
        // The snake starts centred and extends leftward from the head.
        ensure!(
            self.grid_width / 2 + 1 >= self.initial_snake_length,
            "a snake of length {} does not fit left of the centre of a {}-wide grid",
            self.initial_snake_length,
            self.grid_width
        );
        ensure!(
            self.cell_count() > self.initial_snake_length,
            "a {}x{} grid leaves no room for food",
            self.grid_width,
            self.grid_height
        );
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        self.grid_width * self.grid_height
    }

    /// Time between two simulation ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.ticks_per_second.max(1)))
    }
}
