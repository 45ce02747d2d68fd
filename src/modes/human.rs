use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stderr, Stderr};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::game::{Control, GameConfig, Mode, StateMachine};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// Render at 30 FPS (33ms per frame)
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// Keyboard-driven play in the terminal
pub struct HumanMode {
    machine: StateMachine,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    tick_interval: Duration,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig) -> Self {
        let tick_interval = config.tick_interval();

        Self {
            machine: StateMachine::new(config),
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            tick_interval,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal);

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // A late tick is delayed, never replayed in a burst
        let mut tick_timer = interval(self.tick_interval);
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut render_timer = interval(RENDER_INTERVAL);
        render_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(tick_ms = self.tick_interval.as_millis() as u64, "game loop started");

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event)?,
                        Some(Err(err)) => {
                            return Err(err).context("Failed to read terminal event");
                        }
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    self.update_game()?;
                }

                // Render frame
                _ = render_timer.tick() => {
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.machine.state(), &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        info!(
            rounds = self.metrics.rounds_played,
            best = self.metrics.best_score,
            "game loop finished"
        );
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Game(action) => {
                    let from = self.machine.mode();
                    if self.machine.handle(action)? == Control::Exit {
                        self.should_quit = true;
                    }
                    // Resuming from Paused keeps the round; anything else into Playing is new
                    if matches!(from, Mode::Menu | Mode::GameOver)
                        && self.machine.mode() == Mode::Playing
                    {
                        self.metrics.on_round_start();
                    }
                }
                KeyAction::Terminate => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn update_game(&mut self) -> Result<()> {
        let Some(result) = self.machine.tick()? else {
            return Ok(());
        };

        if result.terminated {
            self.metrics.on_round_over(self.machine.state().score());
        } else {
            self.metrics.record_tick(self.tick_interval);
        }

        Ok(())
    }

    fn cleanup_terminal(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) {
        if let Err(err) = disable_raw_mode() {
            error!(?err, "failed to disable raw mode");
        }
        if let Err(err) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
            error!(?err, "failed to leave alternate screen");
        }
        if let Err(err) = terminal.show_cursor() {
            error!(?err, "failed to show cursor");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Position, Snake};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn release(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new_with_kind(
            code,
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ))
    }

    #[test]
    fn test_game_initialization() {
        let mode = HumanMode::new(GameConfig::default());
        assert_eq!(mode.machine.mode(), Mode::Menu);
        assert_eq!(mode.tick_interval, Duration::from_millis(100));
        assert!(!mode.should_quit);
    }

    #[test]
    fn test_enter_starts_round_and_esc_quits_from_menu() {
        let mut mode = HumanMode::new(GameConfig::default());

        mode.handle_event(press(KeyCode::Enter)).unwrap();
        assert_eq!(mode.machine.mode(), Mode::Playing);

        mode.handle_event(press(KeyCode::Char('p'))).unwrap();
        mode.handle_event(press(KeyCode::Esc)).unwrap();
        assert_eq!(mode.machine.mode(), Mode::Menu);
        assert!(!mode.should_quit);

        mode.handle_event(press(KeyCode::Esc)).unwrap();
        assert!(mode.should_quit);
    }

    #[test]
    fn test_key_release_ignored() {
        let mut mode = HumanMode::new(GameConfig::default());
        mode.handle_event(release(KeyCode::Enter)).unwrap();
        assert_eq!(mode.machine.mode(), Mode::Menu);
    }

    #[test]
    fn test_ctrl_c_terminates_from_any_mode() {
        let mut mode = HumanMode::new(GameConfig::default());
        mode.handle_event(press(KeyCode::Enter)).unwrap();

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        mode.handle_event(ctrl_c).unwrap();
        assert!(mode.should_quit);
    }

    #[test]
    fn test_ticks_feed_metrics() {
        let mut mode = HumanMode::new(GameConfig::default());
        mode.handle_event(press(KeyCode::Enter)).unwrap();
        mode.machine.state_mut().round.as_mut().unwrap().food = Position::new(0, 0);

        mode.update_game().unwrap();
        mode.update_game().unwrap();
        assert_eq!(mode.metrics.elapsed_time, Duration::from_millis(200));

        // Paused ticks do not count
        mode.handle_event(press(KeyCode::Char('p'))).unwrap();
        mode.update_game().unwrap();
        assert_eq!(mode.metrics.elapsed_time, Duration::from_millis(200));
        mode.handle_event(press(KeyCode::Char('p'))).unwrap();
        assert_eq!(mode.metrics.elapsed_time, Duration::from_millis(200));

        let round = mode.machine.state_mut().round.as_mut().unwrap();
        round.score = 3;
        round.snake = Snake::from_segments([Position::new(29, 3)], Direction::Right);
        mode.update_game().unwrap();

        assert_eq!(mode.machine.mode(), Mode::GameOver);
        assert_eq!(mode.metrics.rounds_played, 1);
        assert_eq!(mode.metrics.best_score, 3);

        mode.handle_event(press(KeyCode::Char(' '))).unwrap();
        assert_eq!(mode.machine.mode(), Mode::Playing);
        assert_eq!(mode.metrics.elapsed_time, Duration::ZERO);
    }
}
