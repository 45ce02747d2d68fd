use anyhow::{bail, Result};
use rand::{rngs::ThreadRng, seq::IteratorRandom, Rng};
use tracing::{debug, warn};

use super::{
    action::Direction,
    config::GameConfig,
    state::{CollisionType, Position, Round, Snake},
};

/// Random draws tried before falling back to enumerating the free cells
const MAX_FOOD_ATTEMPTS: usize = 64;

/// Result of a single simulation tick
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the round ended on this tick
    pub terminated: bool,
    /// Whether the snake ate food this tick
    pub ate_food: bool,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
}

impl StepResult {
    fn moved(ate_food: bool) -> Self {
        Self {
            terminated: false,
            ate_food,
            collision_type: None,
        }
    }

    fn collided(collision_type: CollisionType) -> Self {
        Self {
            terminated: true,
            ate_food: false,
            collision_type: Some(collision_type),
        }
    }
}

/// Movement, collision and food placement rules
pub struct GameEngine<R = ThreadRng> {
    config: GameConfig,
    rng: R,
}

impl GameEngine<ThreadRng> {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, rand::thread_rng())
    }
}

impl<R: Rng> GameEngine<R> {
    /// Create an engine drawing food positions from `rng`
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Build a fresh round: centred horizontal snake heading right, score 0
    pub fn new_round(&mut self) -> Result<Round> {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
        );
        let food = self.spawn_food(&snake)?;

        debug!(?food, length = snake.len(), "round created");
        Ok(Round::new(snake, food))
    }

    /// Advance the round by one tick.
    ///
    /// Collisions are judged against the body as it was before the move, so a
    /// tail cell about to be vacated still counts as occupied. A colliding
    /// tick leaves the round untouched.
    pub fn step(&mut self, round: &mut Round) -> Result<StepResult> {
        let new_head = round.snake.head().moved_in_direction(round.snake.direction);

        if let Some(collision_type) = self.check_collision(&round.snake, new_head) {
            return Ok(StepResult::collided(collision_type));
        }

        round.snake.push_head(new_head);
        round.ticks += 1;

        let ate_food = new_head == round.food;
        if ate_food {
            round.score += 1;
            round.food = self.spawn_food(&round.snake)?;
        } else {
            round.snake.pop_tail();
        }

        Ok(StepResult::moved(ate_food))
    }

    /// Pick a uniformly random cell not covered by the snake.
    ///
    /// Fails only when the snake covers the whole grid.
    pub fn spawn_food(&mut self, snake: &Snake) -> Result<Position> {
        let width = self.config.grid_width as i32;
        let height = self.config.grid_height as i32;

        for _ in 0..MAX_FOOD_ATTEMPTS {
            let pos = Position::new(
                self.rng.gen_range(0..width),
                self.rng.gen_range(0..height),
            );
            if !snake.contains(pos) {
                return Ok(pos);
            }
        }

        warn!(
            length = snake.len(),
            cells = self.config.cell_count(),
            "food sampling exhausted, enumerating free cells"
        );

        let free = (0..height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
            .filter(|pos| !snake.contains(*pos))
            .choose(&mut self.rng);

        match free {
            Some(pos) => Ok(pos),
            None => bail!(
                "no free cell left for food: snake of length {} fills the {}x{} grid",
                snake.len(),
                width,
                height
            ),
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, snake: &Snake, pos: Position) -> Option<CollisionType> {
        if !pos.is_within(self.config.grid_width, self.config.grid_height) {
            return Some(CollisionType::Wall);
        }

        if snake.contains(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn engine(config: GameConfig) -> GameEngine<StdRng> {
        GameEngine::with_rng(config, StdRng::seed_from_u64(7))
    }

    fn body(snake: &Snake) -> Vec<Position> {
        snake.iter().copied().collect()
    }

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_new_round() {
        let mut engine = engine(GameConfig::default());
        let round = engine.new_round().unwrap();

        assert_eq!(round.score, 0);
        assert_eq!(round.snake.direction, Direction::Right);
        assert_eq!(body(&round.snake), vec![p(15, 10), p(14, 10), p(13, 10)]);
        assert!(!round.snake.contains(round.food));
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = engine(GameConfig::default());
        let mut round = engine.new_round().unwrap();
        round.food = p(0, 0);

        let result = engine.step(&mut round).unwrap();

        assert_eq!(result, StepResult::moved(false));
        assert_eq!(body(&round.snake), vec![p(16, 10), p(15, 10), p(14, 10)]);
        assert_eq!(round.score, 0);
        assert_eq!(round.ticks, 1);
    }

    #[test]
    fn test_food_consumption() {
        let mut engine = engine(GameConfig::default());
        let mut round = engine.new_round().unwrap();
        round.food = p(16, 10);

        let result = engine.step(&mut round).unwrap();

        assert!(result.ate_food);
        assert!(!result.terminated);
        assert_eq!(round.score, 1);
        assert_eq!(
            body(&round.snake),
            vec![p(16, 10), p(15, 10), p(14, 10), p(13, 10)]
        );
        assert!(!round.snake.contains(round.food));
    }

    #[test]
    fn test_wall_collision_leaves_round_untouched() {
        let mut engine = engine(GameConfig::default());
        let mut round = Round::new(
            Snake::from_segments([p(0, 10), p(1, 10), p(2, 10)], Direction::Left),
            p(5, 5),
        );
        let before = round.clone();

        let result = engine.step(&mut round).unwrap();

        assert!(result.terminated);
        assert_eq!(result.collision_type, Some(CollisionType::Wall));
        assert_eq!(round, before);
    }

    #[test]
    fn test_every_edge_is_a_wall() {
        let config = GameConfig::new(30, 20);
        let cases = [
            (p(29, 5), Direction::Right),
            (p(5, 19), Direction::Down),
            (p(0, 0), Direction::Left),
            (p(0, 0), Direction::Up),
        ];

        for (head, direction) in cases {
            let mut engine = engine(config.clone());
            let mut round = Round::new(Snake::new(head, direction, 1), p(10, 10));
            let result = engine.step(&mut round).unwrap();
            assert_eq!(
                result.collision_type,
                Some(CollisionType::Wall),
                "{:?} moving {:?}",
                head,
                direction
            );
        }
    }

    #[test]
    fn test_self_collision() {
        let mut engine = engine(GameConfig::small());

        // Head at (5,5) going Right with length 5:
        // Right: (6,5) ... Down: (6,6) ... Left: (5,6) ... Up: (5,5) is body
        let snake = Snake::new(p(5, 5), Direction::Right, 5);
        let mut round = Round::new(snake, p(8, 8));

        engine.step(&mut round).unwrap();
        round.snake.direction = Direction::Down;
        engine.step(&mut round).unwrap();
        round.snake.direction = Direction::Left;
        engine.step(&mut round).unwrap();
        round.snake.direction = Direction::Up;
        let result = engine.step(&mut round).unwrap();

        assert!(result.terminated);
        assert_eq!(result.collision_type, Some(CollisionType::SelfCollision));
    }

    #[test]
    fn test_moving_into_vacating_tail_collides() {
        let mut engine = engine(GameConfig::small());
        // A 2x2 loop: the next head cell is the current tail.
        let snake = Snake::from_segments([p(1, 0), p(1, 1), p(0, 1), p(0, 0)], Direction::Left);
        let mut round = Round::new(snake, p(5, 5));
        let before = round.clone();

        let result = engine.step(&mut round).unwrap();

        assert_eq!(result.collision_type, Some(CollisionType::SelfCollision));
        assert_eq!(round, before);
    }

    #[test]
    fn test_length_constant_unless_eating() {
        let mut engine = engine(GameConfig::new(30, 20));
        let mut round = engine.new_round().unwrap();
        round.food = p(0, 0);

        for _ in 0..5 {
            let before = round.snake.len();
            engine.step(&mut round).unwrap();
            assert_eq!(round.snake.len(), before);
        }

        let before = round.snake.len();
        round.food = round.snake.head().moved_in_direction(round.snake.direction);
        engine.step(&mut round).unwrap();
        assert_eq!(round.snake.len(), before + 1);
        assert_eq!(round.score, 1);
    }

    #[test]
    fn test_food_never_on_snake() {
        let mut engine = engine(GameConfig::new(8, 8));
        let mut round = engine.new_round().unwrap();

        // Keep feeding the snake so food is relocated on every tick.
        for _ in 0..3 {
            round.food = round.snake.head().moved_in_direction(round.snake.direction);
            engine.step(&mut round).unwrap();
            assert!(!round.snake.contains(round.food));
        }

        for seed in 0..32 {
            let mut engine =
                GameEngine::with_rng(GameConfig::new(8, 8), StdRng::seed_from_u64(seed));
            let round = engine.new_round().unwrap();
            assert!(!round.snake.contains(round.food));
        }
    }

    #[test]
    fn test_spawn_food_finds_last_free_cell() {
        let mut engine = engine(GameConfig::new(4, 1));
        let snake = Snake::from_segments([p(0, 0), p(1, 0), p(2, 0)], Direction::Left);

        assert_eq!(engine.spawn_food(&snake).unwrap(), p(3, 0));
    }

    #[test]
    fn test_spawn_food_on_full_grid_fails() {
        let mut engine = engine(GameConfig::new(4, 1));
        let snake = Snake::from_segments([p(0, 0), p(1, 0), p(2, 0), p(3, 0)], Direction::Left);

        let err = engine.spawn_food(&snake).unwrap_err();
        assert!(err.to_string().contains("no free cell"));
    }
}
