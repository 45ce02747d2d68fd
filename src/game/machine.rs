use anyhow::Result;
use rand::{rngs::ThreadRng, Rng};
use tracing::{debug, info};

use super::{
    action::{Action, Direction},
    config::GameConfig,
    engine::{GameEngine, StepResult},
    state::{GameState, Mode},
};

/// What the caller should do after an input was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

/// Owns the game state and applies mode transitions.
///
/// | mode     | input         | result                     |
/// |----------|---------------|----------------------------|
/// | Menu     | Confirm       | Playing, fresh round       |
/// | Menu     | Quit, Back    | exit                       |
/// | Playing  | Move          | turn unless reversing      |
/// | Playing  | Pause         | Paused                     |
/// | Paused   | Pause         | Playing                    |
/// | Paused   | Quit, Back    | Menu, round dropped        |
/// | GameOver | Confirm       | Playing, fresh round       |
/// | GameOver | Quit, Back    | Menu, round dropped        |
///
/// Anything not listed is ignored.
pub struct StateMachine<R = ThreadRng> {
    engine: GameEngine<R>,
    state: GameState,
}

impl StateMachine<ThreadRng> {
    pub fn new(config: GameConfig) -> Self {
        Self::from_engine(GameEngine::new(config))
    }
}

impl<R: Rng> StateMachine<R> {
    /// Start on the menu with the given engine
    pub fn from_engine(engine: GameEngine<R>) -> Self {
        let config = engine.config();
        let state = GameState::new(config.grid_width, config.grid_height);
        Self { engine, state }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Apply one input event
    pub fn handle(&mut self, action: Action) -> Result<Control> {
        match (self.state.mode, action) {
            (Mode::Menu, Action::Confirm) | (Mode::GameOver, Action::Confirm) => {
                self.start_round()?;
            }
            (Mode::Menu, Action::Quit) | (Mode::Menu, Action::Back) => {
                info!("quit from menu");
                return Ok(Control::Exit);
            }
            (Mode::Playing, Action::Move(direction)) => self.turn(direction),
            (Mode::Playing, Action::Pause) => self.set_mode(Mode::Paused),
            (Mode::Paused, Action::Pause) => self.set_mode(Mode::Playing),
            (Mode::Paused, Action::Quit)
            | (Mode::Paused, Action::Back)
            | (Mode::GameOver, Action::Quit)
            | (Mode::GameOver, Action::Back) => {
                self.state.round = None;
                self.set_mode(Mode::Menu);
            }
            _ => {}
        }

        Ok(Control::Continue)
    }

    /// Advance the simulation by one tick. Does nothing outside `Playing`.
    pub fn tick(&mut self) -> Result<Option<StepResult>> {
        if self.state.mode != Mode::Playing {
            return Ok(None);
        }
        let Some(round) = self.state.round.as_mut() else {
            return Ok(None);
        };

        let result = self.engine.step(round)?;

        if result.ate_food {
            debug!(score = round.score, food = ?round.food, "food eaten");
        }

        if result.terminated {
            info!(
                score = round.score,
                length = round.snake.len(),
                ticks = round.ticks,
                collision = ?result.collision_type,
                "game over"
            );
            self.set_mode(Mode::GameOver);
        }

        Ok(Some(result))
    }

    fn start_round(&mut self) -> Result<()> {
        let round = self.engine.new_round()?;
        info!(
            width = self.state.grid_width,
            height = self.state.grid_height,
            "round started"
        );
        self.state.round = Some(round);
        self.set_mode(Mode::Playing);
        Ok(())
    }

    /// Validated against the direction currently stored on the snake, which
    /// is what the next tick will apply.
    fn turn(&mut self, direction: Direction) {
        if let Some(round) = self.state.round.as_mut() {
            if !round.snake.direction.is_opposite(direction) {
                round.snake.direction = direction;
            }
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.state.mode != mode {
            debug!(from = ?self.state.mode, to = ?mode, "mode change");
            self.state.mode = mode;
        }
    }
}
