use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Action, Direction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Game(Action),
    /// Leave immediately from any screen
    Terminate,
    None,
}

/// Maps raw keys to logical actions
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Terminate;
        }

        let action = match key.code {
            // Movement - Arrow keys
            KeyCode::Up => Action::Move(Direction::Up),
            KeyCode::Down => Action::Move(Direction::Down),
            KeyCode::Left => Action::Move(Direction::Left),
            KeyCode::Right => Action::Move(Direction::Right),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => Action::Move(Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => Action::Move(Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => Action::Move(Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => Action::Move(Direction::Right),

            // Controls
            KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,
            KeyCode::Char('p') | KeyCode::Char('P') => Action::Pause,
            KeyCode::Esc => Action::Back,
            KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,

            _ => return KeyAction::None,
        };

        KeyAction::Game(action)
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
