//! Grid Snake - a terminal Snake game
//!
//! This library provides:
//! - Core game logic and the mode state machine (game module)
//! - Key mapping (input module)
//! - TUI rendering (render module)
//! - Session statistics (metrics module)
//! - The interactive terminal loop (modes module)

pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
