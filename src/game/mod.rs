//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The terminal front end drives it through [`StateMachine`].

pub mod action;
pub mod config;
pub mod engine;
pub mod machine;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::GameConfig;
pub use engine::{GameEngine, StepResult};
pub use machine::{Control, StateMachine};
pub use state::{CollisionType, GameState, Mode, Position, Round, Snake};
