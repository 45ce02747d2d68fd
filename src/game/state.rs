use std::collections::VecDeque;

use super::action::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// True if the position lies inside a `width` x `height` grid
    pub fn is_within(&self, width: usize, height: usize) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as usize) < width && (self.y as usize) < height
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, head at the front and tail at the back
    body: VecDeque<Position>,
    /// Direction applied on the next tick
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let (dx, dy) = direction.opposite().delta();

        let body = (0..length.max(1) as i32)
            .map(|i| head.moved_by(dx * i, dy * i))
            .collect();

        Self { body, direction }
    }

    /// Build a snake from explicit segments, head first
    #[cfg(test)]
    pub(crate) fn from_segments(
        segments: impl IntoIterator<Item = Position>,
        direction: Direction,
    ) -> Self {
        let body: VecDeque<Position> = segments.into_iter().collect();
        assert!(!body.is_empty(), "a snake needs at least one segment");
        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// True if any segment, tail included, sits on `pos`
    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Segments from head to tail
    pub fn iter(&self) -> impl Iterator<Item = &Position> + '_ {
        self.body.iter()
    }

    pub fn push_head(&mut self, pos: Position) {
        self.body.push_front(pos);
    }

    /// Drop the tail segment. The last remaining segment is never removed.
    pub fn pop_tail(&mut self) -> Option<Position> {
        if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Everything that lives for exactly one playthrough
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub snake: Snake,
    pub food: Position,
    pub score: u32,
    /// Ticks survived so far
    pub ticks: u32,
}

impl Round {
    pub fn new(snake: Snake, food: Position) -> Self {
        Self {
            snake,
            food,
            score: 0,
            ticks: 0,
        }
    }
}

/// Which screen the game is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub mode: Mode,
    /// The live or frozen round; `None` while on the menu
    pub round: Option<Round>,
    pub grid_width: usize,
    pub grid_height: usize,
}

impl GameState {
    /// Create a new game state sitting on the menu
    pub fn new(grid_width: usize, grid_height: usize) -> Self {
        Self {
            mode: Mode::Menu,
            round: None,
            grid_width,
            grid_height,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.is_within(self.grid_width, self.grid_height)
    }

    pub fn score(&self) -> u32 {
        self.round.as_ref().map_or(0, |round| round.score)
    }
}
